// src/guard.rs

//! # Actuator Guard Module
//!
//! Converts a desired control-surface angle into a motor duty command. The
//! inner angle-to-duty loop only runs when the potentiometer reading is
//! plausible: a reading that moved by the jump threshold or more since the
//! previous cycle is treated as contact noise and the surface is commanded
//! to zero duty for that cycle.

use crate::config::GuardConfig;
use crate::pid::{FeedbackController, FeedbackGains};
use num_traits::Float;

/// Result of one guard cycle for one control surface.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SurfaceCommand {
    /// Surface angle requested by the outer loop (degrees).
    pub desired_angle: f32,
    /// Surface angle read this cycle (degrees).
    pub current_angle: f32,
    /// Signed duty in percent, within the guard's duty limit.
    pub duty: i8,
    /// The reading jumped and the duty was forced to zero.
    pub rejected: bool,
}

/// Clamps a raw controller output to `[-limit, limit]` and rounds it to the
/// nearest whole duty unit.
pub fn saturate_duty(raw: f32, limit: i8) -> i8 {
    let limit = limit.unsigned_abs() as f32;
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(-limit, limit).round() as i8
}

/// Jump-rejecting angle to duty stage for one control surface.
pub struct ActuatorGuard {
    controller: FeedbackController<f32>,
    config: GuardConfig,
    previous_angle: f32,
}

impl ActuatorGuard {
    /// Creates a guard whose angle-to-duty loop runs every `dt` seconds.
    /// `initial_angle` is the first reading of the surface's position sensor.
    pub fn new(
        gains: FeedbackGains<f32>,
        dt: f32,
        config: GuardConfig,
        initial_angle: f32,
    ) -> Self {
        Self {
            controller: FeedbackController::new(gains, dt),
            config,
            previous_angle: initial_angle,
        }
    }

    /// Reading accepted as the previous sample.
    pub fn previous_angle(&self) -> f32 {
        self.previous_angle
    }

    /// The inner angle-to-duty loop.
    pub fn controller(&self) -> &FeedbackController<f32> {
        &self.controller
    }

    /// Retunes the inner angle-to-duty loop.
    pub fn set_gains(&mut self, gains: FeedbackGains<f32>) {
        self.controller.set_gains(gains);
    }

    /// Records a reading without commanding the surface.
    pub fn observe(&mut self, angle: f32) {
        self.previous_angle = angle;
    }

    /// Runs one guard cycle.
    pub fn command(&mut self, desired_angle: f32, current_angle: f32) -> SurfaceCommand {
        let jump = (current_angle - self.previous_angle).abs();
        self.previous_angle = current_angle;

        // NaN readings fail the comparison and are rejected too.
        if !(jump < self.config.jump_threshold_deg) {
            debug!("surface reading jumped by {} deg, holding", jump);
            return SurfaceCommand {
                desired_angle,
                current_angle,
                duty: 0,
                rejected: true,
            };
        }

        let raw = self.controller.output(current_angle, desired_angle);
        SurfaceCommand {
            desired_angle,
            current_angle,
            duty: saturate_duty(raw, self.config.duty_limit),
            rejected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rudder_guard(initial: f32) -> ActuatorGuard {
        ActuatorGuard::new(FeedbackGains::proportional(3.0), 0.05, GuardConfig::new(), initial)
    }

    /// Test that a jump at or above the threshold commands zero duty.
    #[test]
    fn test_guard_rejects_jump() {
        for desired in [-50.0, 0.0, 12.0, 50.0] {
            let mut guard = rudder_guard(0.0);
            let command = guard.command(desired, 30.0);
            assert_eq!(0, command.duty, "Jump of exactly the threshold is rejected.");
            assert!(command.rejected);

            let mut guard = rudder_guard(10.0);
            let command = guard.command(desired, -45.0);
            assert_eq!(0, command.duty);
            assert!(command.rejected);
        }
    }

    /// Test that the inner loop is not evaluated on a rejected cycle.
    #[test]
    fn test_guard_rejected_cycle_skips_controller() {
        let mut guard = ActuatorGuard::new(
            FeedbackGains::new(1.0, 1.0, 0.0),
            1.0,
            GuardConfig::new(),
            0.0,
        );
        let _ = guard.command(20.0, 40.0);
        assert_eq!(0.0, guard.controller().integral());
        assert_eq!(0.0, guard.controller().previous_error());
    }

    /// Test that a sustained new position is accepted after one cycle.
    #[test]
    fn test_guard_accepts_sustained_position() {
        let mut guard = rudder_guard(0.0);
        assert!(guard.command(40.0, 35.0).rejected);
        assert_eq!(35.0, guard.previous_angle());

        let command = guard.command(40.0, 35.0);
        assert!(!command.rejected);
        assert_eq!(15, command.duty);
    }

    /// Test the proportional duty below the jump threshold.
    #[test]
    fn test_guard_duty_in_range() {
        let mut guard = rudder_guard(0.0);
        let command = guard.command(10.0, 2.0);
        assert_eq!(24, command.duty);
        assert_eq!(10.0, command.desired_angle);
        assert_eq!(2.0, command.current_angle);
        assert!(!command.rejected);
    }

    /// Test that the guard output saturates at the duty limit.
    #[test]
    fn test_guard_duty_saturates() {
        let mut guard = rudder_guard(0.0);
        assert_eq!(100, guard.command(50.0, 5.0).duty);
        assert_eq!(-100, guard.command(-50.0, 10.0).duty);
    }

    /// Test that observing a reading rebases the jump check.
    #[test]
    fn test_guard_observe_rebases() {
        let mut guard = rudder_guard(0.0);
        guard.observe(60.0);
        let command = guard.command(60.0, 61.0);
        assert!(!command.rejected);
        assert_eq!(-3, command.duty);
    }

    /// Test duty clamping and rounding.
    #[test]
    fn test_saturate_duty() {
        assert_eq!(100, saturate_duty(100.4, 100));
        assert_eq!(100, saturate_duty(1_000.0, 100));
        assert_eq!(-100, saturate_duty(-100.6, 100));
        assert_eq!(-100, saturate_duty(-1e9, 100));
        assert_eq!(43, saturate_duty(42.5, 100));
        assert_eq!(-43, saturate_duty(-42.5, 100));
        assert_eq!(42, saturate_duty(42.49, 100));
        assert_eq!(0, saturate_duty(0.3, 100));
        assert_eq!(0, saturate_duty(f32::NAN, 100));
        assert_eq!(60, saturate_duty(75.0, 60));
    }
}
