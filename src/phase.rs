// src/phase.rs

//! # Flight Phase Module
//!
//! The supervisory state machine of the glider. It sequences
//! `Disabled -> WaitForLaunch -> Active -> Disabled` and, while active, runs
//! both control cascades once per control period:
//!
//! ```text
//! yaw   -> [yaw_to_rudder]     -> rudder angle   -> [guard + rudder_to_duty]   -> rudder duty
//! pitch -> [pitch_to_elevator] -> elevator angle -> [guard + elevator_to_duty] -> elevator duty
//! ```
//!
//! Launch and landing are detected from the near-ground flag with a
//! continuous-run debounce: a single contrary reading resets the timer.

use crate::config::FlightPhaseConfig;
use crate::estimator::Attitude;
use crate::guard::{ActuatorGuard, SurfaceCommand};
use crate::pid::{FeedbackController, FeedbackGains};
use crate::sensors::PositionSensor;

/// Phase of flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlightPhase {
    /// Both surfaces held at zero duty.
    #[default]
    Disabled,
    /// Armed, waiting to be clear of the ground.
    WaitForLaunch,
    /// Cascades running.
    Active,
}

/// One edge of the two control cascades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CascadeLoop {
    /// Yaw error to desired rudder angle.
    YawToRudder,
    /// Rudder angle error to rudder duty.
    RudderToDuty,
    /// Pitch error to desired elevator angle.
    PitchToElevator,
    /// Elevator angle error to elevator duty.
    ElevatorToDuty,
}

/// Inputs sampled by the control task at the start of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleInputs {
    /// Latest near-ground flag.
    pub near_ground: bool,
    /// Latest attitude estimate.
    pub attitude: Attitude,
    /// A calibration request is pending.
    pub calibrate: bool,
}

/// What one control cycle decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutput {
    /// Phase after the cycle.
    pub phase: FlightPhase,
    /// Rudder command, `None` when the cascades did not run.
    pub rudder: Option<SurfaceCommand>,
    /// Elevator command, `None` when the cascades did not run.
    pub elevator: Option<SurfaceCommand>,
    /// The pending calibration request was serviced.
    pub calibrated: bool,
}

impl CycleOutput {
    /// Duty for the rudder motor.
    pub fn rudder_duty(&self) -> i8 {
        self.rudder.map_or(0, |command| command.duty)
    }

    /// Duty for the elevator motor.
    pub fn elevator_duty(&self) -> i8 {
        self.elevator.map_or(0, |command| command.duty)
    }
}

/// Wraps an angle into `(-180, 180]` degrees.
fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// One cascade: attitude to desired angle, then angle to duty.
struct Surface<P> {
    sensor: P,
    outer: FeedbackController<f32>,
    guard: ActuatorGuard,
}

impl<P: PositionSensor> Surface<P> {
    fn new(
        mut sensor: P,
        outer: FeedbackGains<f32>,
        inner: FeedbackGains<f32>,
        config: &FlightPhaseConfig,
    ) -> Self {
        let dt = config.dt();
        let initial_angle = sensor.read_angle();
        Self {
            sensor,
            outer: FeedbackController::new(outer, dt),
            guard: ActuatorGuard::new(inner, dt, config.guard, initial_angle),
        }
    }

    fn calibrate(&mut self) {
        self.sensor.zero();
        self.observe();
    }

    fn observe(&mut self) {
        let angle = self.sensor.read_angle();
        self.guard.observe(angle);
    }

    fn run(&mut self, setpoint_deg: f32, measured_deg: f32, limit_deg: f32) -> SurfaceCommand {
        let desired = self
            .outer
            .output(measured_deg, setpoint_deg)
            .clamp(-limit_deg, limit_deg);
        let current = self.sensor.read_angle();
        self.guard.command(desired, current)
    }
}

/// Flight-phase supervisor owning both cascades.
///
/// `R` and `E` are the rudder and elevator position sensors.
pub struct FlightPhaseController<R, E> {
    config: FlightPhaseConfig,
    phase: FlightPhase,
    debounce_ms: u32,
    rudder: Surface<R>,
    elevator: Surface<E>,
}

impl<R: PositionSensor, E: PositionSensor> FlightPhaseController<R, E> {
    /// Creates a disabled supervisor. Both position sensors are read once
    /// to seed the jump check of their guards.
    pub fn new(config: FlightPhaseConfig, rudder_sensor: R, elevator_sensor: E) -> Self {
        let rudder = Surface::new(
            rudder_sensor,
            config.yaw_to_rudder,
            config.rudder_to_duty,
            &config,
        );
        let elevator = Surface::new(
            elevator_sensor,
            config.pitch_to_elevator,
            config.elevator_to_duty,
            &config,
        );

        Self {
            config,
            phase: FlightPhase::Disabled,
            debounce_ms: 0,
            rudder,
            elevator,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// Time accumulated towards the next debounced transition.
    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }

    /// Configuration in use.
    pub fn config(&self) -> &FlightPhaseConfig {
        &self.config
    }

    /// Rudder position sensor.
    pub fn rudder_sensor_mut(&mut self) -> &mut R {
        &mut self.rudder.sensor
    }

    /// Elevator position sensor.
    pub fn elevator_sensor_mut(&mut self) -> &mut E {
        &mut self.elevator.sensor
    }

    /// Applies an operator phase request and restarts the debounce timer.
    ///
    /// The operator can only arm ([`FlightPhase::WaitForLaunch`]) or disarm
    /// ([`FlightPhase::Disabled`]). [`FlightPhase::Active`] is entered by
    /// launch detection alone, so a request for it is refused and leaves the
    /// supervisor untouched. Returns whether the request was applied.
    pub fn request(&mut self, phase: FlightPhase) -> bool {
        if phase == FlightPhase::Active {
            warn!("operator request for {} refused", phase);
            return false;
        }
        if phase != self.phase {
            info!("operator requested {}", phase);
        }
        self.enter(phase);
        true
    }

    /// Enters `phase` directly, skipping launch detection.
    #[cfg(test)]
    pub(crate) fn force_phase(&mut self, phase: FlightPhase) {
        self.enter(phase);
    }

    /// Retunes one loop edge without resetting its state.
    pub fn set_loop_gains(&mut self, edge: CascadeLoop, gains: FeedbackGains<f32>) {
        match edge {
            CascadeLoop::YawToRudder => self.rudder.outer.set_gains(gains),
            CascadeLoop::RudderToDuty => self.rudder.guard.set_gains(gains),
            CascadeLoop::PitchToElevator => self.elevator.outer.set_gains(gains),
            CascadeLoop::ElevatorToDuty => self.elevator.guard.set_gains(gains),
        }
    }

    /// Gains of one loop edge.
    pub fn loop_gains(&self, edge: CascadeLoop) -> FeedbackGains<f32> {
        match edge {
            CascadeLoop::YawToRudder => self.rudder.outer.gains(),
            CascadeLoop::RudderToDuty => self.rudder.guard.controller().gains(),
            CascadeLoop::PitchToElevator => self.elevator.outer.gains(),
            CascadeLoop::ElevatorToDuty => self.elevator.guard.controller().gains(),
        }
    }

    fn enter(&mut self, phase: FlightPhase) {
        self.phase = phase;
        self.debounce_ms = 0;
    }

    /// Adds one period to the debounce timer when `accumulate` holds, resets
    /// it otherwise, and reports whether the debounce time has been reached.
    fn debounce(&mut self, accumulate: bool) -> bool {
        if accumulate {
            self.debounce_ms = self.debounce_ms.saturating_add(self.config.period_ms);
        } else {
            self.debounce_ms = 0;
        }
        self.debounce_ms >= self.config.debounce_ms
    }

    /// Runs one control period.
    pub fn step(&mut self, inputs: CycleInputs) -> CycleOutput {
        if inputs.calibrate {
            self.rudder.calibrate();
            self.elevator.calibrate();
            info!("position sensors zeroed");
        }

        let commands = match self.phase {
            FlightPhase::Disabled => {
                self.debounce_ms = 0;
                None
            }
            FlightPhase::WaitForLaunch => {
                if self.debounce(!inputs.near_ground) {
                    info!("launch detected");
                    self.enter(FlightPhase::Active);
                }
                None
            }
            FlightPhase::Active => {
                if self.debounce(inputs.near_ground) {
                    info!("landing detected");
                    self.enter(FlightPhase::Disabled);
                    None
                } else {
                    Some(self.run_cascades(inputs))
                }
            }
        };

        let (rudder, elevator) = match commands {
            Some((rudder, elevator)) => (Some(rudder), Some(elevator)),
            None => {
                self.rudder.observe();
                self.elevator.observe();
                (None, None)
            }
        };

        CycleOutput {
            phase: self.phase,
            rudder,
            elevator,
            calibrated: inputs.calibrate,
        }
    }

    fn run_cascades(&mut self, inputs: CycleInputs) -> (SurfaceCommand, SurfaceCommand) {
        let pitch_setpoint = if inputs.near_ground {
            self.config.flare_pitch_deg
        } else {
            self.config.level_pitch_deg
        };
        let limit = self.config.surface_angle_limit_deg;

        let yaw = wrap_degrees(inputs.attitude.yaw_deg());
        let rudder = self.rudder.run(self.config.yaw_setpoint_deg, yaw, limit);
        let elevator = self
            .elevator
            .run(pitch_setpoint, inputs.attitude.pitch_deg(), limit);

        (rudder, elevator)
    }
}
