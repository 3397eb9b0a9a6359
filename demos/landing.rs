// demos/landing.rs

//! Simulated launch, glide and landing on the host.
//!
//! The control task is stepped every 50 ms against a toy glider: the
//! elevator and rudder follow their motor duty, pitch follows the elevator,
//! and the glider sinks until it reaches the ground.
//!
//! ```sh
//! cargo run --example landing
//! ```

use std::cell::Cell;
use std::rc::Rc;

use glider_flight_stabilization::config::{FlightPhaseConfig, RangingConfig};
use glider_flight_stabilization::estimator::Attitude;
use glider_flight_stabilization::sensors::PositionSensor;
use glider_flight_stabilization::tasks::{is_near_ground, ControlTask};
use glider_flight_stabilization::{FlightPhase, Shares};

/// Degrees of surface travel per percent duty per control period.
const SURFACE_RATE: f32 = 0.05;
/// Sink rate in cm per control period.
const SINK_RATE: f32 = 3.0;

/// A surface whose angle is shared with the simulation.
struct SimulatedPot {
    angle: Rc<Cell<f32>>,
    zero: f32,
}

impl PositionSensor for SimulatedPot {
    fn read_angle(&mut self) -> f32 {
        self.angle.get() - self.zero
    }

    fn zero(&mut self) {
        self.zero = self.angle.get();
    }
}

fn main() {
    let shares = Shares::new();
    let ranging = RangingConfig::new();
    let config = FlightPhaseConfig::new();

    let rudder = Rc::new(Cell::new(2.0));
    let elevator = Rc::new(Cell::new(-1.5));
    let mut control = ControlTask::new(
        config,
        SimulatedPot {
            angle: rudder.clone(),
            zero: 0.0,
        },
        SimulatedPot {
            angle: elevator.clone(),
            zero: 0.0,
        },
    );

    shares.attitude_ready.put(true);

    // Thrown from a 6 m ridge with the nose slightly down and the heading
    // off to the left.
    let mut altitude_cm = 0.0f32;
    let mut attitude = Attitude {
        pitch: (-6.0f32).to_radians(),
        roll: 0.0,
        yaw: (-8.0f32).to_radians(),
    };
    let mut phase = FlightPhase::Disabled;

    for cycle in 0..400u32 {
        let t_ms = cycle * config.period_ms;

        match cycle {
            2 => {
                println!("{t_ms:>5} ms  operator arms the glider");
                shares.request_phase(FlightPhase::WaitForLaunch);
            }
            10 => {
                println!("{t_ms:>5} ms  launch");
                altitude_cm = 600.0;
            }
            _ => {}
        }

        shares
            .near_ground
            .put(is_near_ground(altitude_cm, ranging.near_ground_cm));
        shares.attitude.put(attitude);

        let output = control.cycle(&shares);
        if output.phase != phase {
            println!("{t_ms:>5} ms  {:?} -> {:?}", phase, output.phase);
            phase = output.phase;
        }

        // Toy plant
        rudder.set(rudder.get() + SURFACE_RATE * output.rudder_duty() as f32);
        elevator.set(elevator.get() + SURFACE_RATE * output.elevator_duty() as f32);
        if altitude_cm > 0.0 {
            attitude.pitch += 0.02 * (elevator.get().to_radians() - attitude.pitch);
            attitude.yaw += 0.02 * (-rudder.get().to_radians() - attitude.yaw);
            altitude_cm = (altitude_cm - SINK_RATE * (1.0 - attitude.pitch.sin())).max(0.0);
        }

        if let (Some(rudder_cmd), Some(elevator_cmd)) = (output.rudder, output.elevator) {
            if cycle % 10 == 0 {
                println!(
                    "{t_ms:>5} ms  alt {altitude_cm:6.1} cm  pitch {:6.2}  yaw {:6.2}  \
                     rudder {:6.2} -> {:6.2} ({:4})  elevator {:6.2} -> {:6.2} ({:4})",
                    attitude.pitch_deg(),
                    attitude.yaw_deg(),
                    rudder_cmd.current_angle,
                    rudder_cmd.desired_angle,
                    rudder_cmd.duty,
                    elevator_cmd.current_angle,
                    elevator_cmd.desired_angle,
                    elevator_cmd.duty,
                );
            }
        }

        if phase == FlightPhase::Disabled && cycle > 10 {
            println!("{t_ms:>5} ms  landed");
            break;
        }
    }
}
