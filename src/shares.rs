// src/shares.rs

//! # Cross-Task Shares
//!
//! Single-slot cells holding the most recent value written by one task and
//! read by others. A read never waits: it returns whatever was published
//! last, or the initial value if nothing was. Each access runs inside a
//! critical section so multi-word values are never observed half written.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::estimator::Attitude;
use crate::phase::FlightPhase;

/// A most-recent-value cell.
pub struct SharedCell<T> {
    inner: Mutex<CriticalSectionRawMutex, Cell<T>>,
}

impl<T: Copy> SharedCell<T> {
    /// Creates a cell holding `value`.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(value)),
        }
    }

    /// Publishes a new value.
    pub fn put(&self, value: T) {
        self.inner.lock(|cell| cell.set(value));
    }

    /// Latest value.
    pub fn get(&self) -> T {
        self.inner.lock(|cell| cell.get())
    }

    /// Publishes `value` and returns the one it replaced.
    pub fn replace(&self, value: T) -> T {
        self.inner.lock(|cell| cell.replace(value))
    }
}

/// Every value exchanged between the ranging, attitude, control and motor
/// tasks and the operator interface.
///
/// Typically placed in a `static`:
///
/// ```
/// use glider_flight_stabilization::{FlightPhase, Shares};
///
/// static SHARES: Shares = Shares::new();
///
/// SHARES.request_phase(FlightPhase::WaitForLaunch);
/// assert_eq!(Some(FlightPhase::WaitForLaunch), SHARES.phase_request.get());
/// ```
pub struct Shares {
    /// Written by the ranging task.
    pub near_ground: SharedCell<bool>,
    /// Written by the control task.
    pub phase: SharedCell<FlightPhase>,
    /// Written by the operator, taken by the control task.
    pub phase_request: SharedCell<Option<FlightPhase>>,
    /// Written by the control task, read by the rudder motor task.
    pub rudder_duty: SharedCell<i8>,
    /// Written by the control task, read by the elevator motor task.
    pub elevator_duty: SharedCell<i8>,
    /// Written by the attitude task.
    pub attitude: SharedCell<Attitude>,
    /// Set once the inertial sensor initialized.
    pub attitude_ready: SharedCell<bool>,
    /// Written by the operator, cleared by the control task once serviced.
    pub calibrate: SharedCell<bool>,
    /// Written by the operator, cleared by the attitude task once serviced.
    pub zero_yaw: SharedCell<bool>,
}

impl Shares {
    /// Creates the shares in their power-on state: disabled, zero duty, and
    /// a calibration pending.
    pub const fn new() -> Self {
        Self {
            near_ground: SharedCell::new(false),
            phase: SharedCell::new(FlightPhase::Disabled),
            phase_request: SharedCell::new(None),
            rudder_duty: SharedCell::new(0),
            elevator_duty: SharedCell::new(0),
            attitude: SharedCell::new(Attitude::level()),
            attitude_ready: SharedCell::new(false),
            calibrate: SharedCell::new(true),
            zero_yaw: SharedCell::new(true),
        }
    }

    /// Asks the control task to switch phase on its next cycle.
    ///
    /// Only arming ([`FlightPhase::WaitForLaunch`]) and disarming
    /// ([`FlightPhase::Disabled`]) are honoured; a request for
    /// [`FlightPhase::Active`] is refused by the supervisor.
    pub fn request_phase(&self, phase: FlightPhase) {
        self.phase_request.put(Some(phase));
    }

    /// Disarms the glider, asks the control task to re-zero both position
    /// sensors and the attitude task to take the current heading as zero yaw.
    pub fn request_calibration(&self) {
        self.request_phase(FlightPhase::Disabled);
        self.calibrate.put(true);
        self.zero_yaw.put(true);
    }
}

impl Default for Shares {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that a cell returns the last value put, without consuming it.
    #[test]
    fn test_cell_keeps_latest_value() {
        let cell = SharedCell::new(1u8);
        assert_eq!(1, cell.get());
        assert_eq!(1, cell.get(), "Reading does not consume.");

        cell.put(2);
        cell.put(3);
        assert_eq!(3, cell.get());
    }

    /// Test that `replace` hands back the value it overwrote.
    #[test]
    fn test_cell_replace_returns_previous() {
        let cell = SharedCell::new(true);
        assert!(cell.replace(false));
        assert!(!cell.replace(false));
        assert!(!cell.get());
    }

    /// Test the power-on state: disabled, zero duty, calibration pending.
    #[test]
    fn test_power_on_state() {
        let shares = Shares::new();
        assert_eq!(FlightPhase::Disabled, shares.phase.get());
        assert_eq!(None, shares.phase_request.get());
        assert_eq!(0, shares.rudder_duty.get());
        assert_eq!(0, shares.elevator_duty.get());
        assert!(!shares.near_ground.get());
        assert!(!shares.attitude_ready.get());
        assert!(shares.calibrate.get(), "Calibration pending at power on.");
        assert!(shares.zero_yaw.get());
    }

    /// Test that the operator requests land in their shares.
    #[test]
    fn test_operator_requests() {
        let shares = Shares::new();
        shares.calibrate.put(false);
        shares.zero_yaw.put(false);

        shares.request_phase(FlightPhase::WaitForLaunch);
        assert_eq!(Some(FlightPhase::WaitForLaunch), shares.phase_request.get());

        shares.request_calibration();
        assert_eq!(
            Some(FlightPhase::Disabled),
            shares.phase_request.get(),
            "Calibration disarms."
        );
        assert!(shares.calibrate.get());
        assert!(shares.zero_yaw.get());
    }

    /// Test that the shares can live in a `static`.
    #[test]
    fn test_shares_in_static() {
        static SHARES: Shares = Shares::new();
        SHARES.rudder_duty.put(-42);
        assert_eq!(-42, SHARES.rudder_duty.get());
    }
}
