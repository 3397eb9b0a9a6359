// src/tasks/control.rs

//! Control task: owns the flight-phase supervisor and both cascades.

use embassy_time::{Duration, Ticker};

use crate::config::FlightPhaseConfig;
use crate::phase::{CycleInputs, CycleOutput, FlightPhase, FlightPhaseController};
use crate::sensors::PositionSensor;
use crate::shares::Shares;

/// Control task state.
pub struct ControlTask<R, E> {
    supervisor: FlightPhaseController<R, E>,
}

impl<R: PositionSensor, E: PositionSensor> ControlTask<R, E> {
    /// Creates the task around a new, disabled supervisor.
    pub fn new(config: FlightPhaseConfig, rudder_sensor: R, elevator_sensor: E) -> Self {
        Self {
            supervisor: FlightPhaseController::new(config, rudder_sensor, elevator_sensor),
        }
    }

    /// The supervisor.
    pub fn supervisor(&self) -> &FlightPhaseController<R, E> {
        &self.supervisor
    }

    /// The supervisor, e.g. to retune a loop.
    pub fn supervisor_mut(&mut self) -> &mut FlightPhaseController<R, E> {
        &mut self.supervisor
    }

    /// Runs one control period against the shares.
    ///
    /// A pending operator phase request is applied first; a request for
    /// [`FlightPhase::Active`] is refused. Without attitude
    /// data the supervisor is held in [`FlightPhase::Disabled`]. The
    /// calibration request is taken, so it is serviced exactly once.
    pub fn cycle(&mut self, shares: &Shares) -> CycleOutput {
        if let Some(phase) = shares.phase_request.replace(None) {
            self.supervisor.request(phase);
        }

        if !shares.attitude_ready.get() && self.supervisor.phase() != FlightPhase::Disabled {
            warn!("no attitude data, staying disabled");
            self.supervisor.request(FlightPhase::Disabled);
        }

        let inputs = CycleInputs {
            near_ground: shares.near_ground.get(),
            attitude: shares.attitude.get(),
            calibrate: shares.calibrate.replace(false),
        };
        let output = self.supervisor.step(inputs);

        shares.rudder_duty.put(output.rudder_duty());
        shares.elevator_duty.put(output.elevator_duty());
        shares.phase.put(output.phase);
        output
    }

    /// Runs the task forever at the configured control period.
    pub async fn run(mut self, shares: &Shares) -> ! {
        let period = Duration::from_millis(self.supervisor.config().period_ms as u64);
        let mut ticker = Ticker::every(period);
        loop {
            self.cycle(shares);
            ticker.next().await;
        }
    }
}
