// src/pid/feedback.rs

//! # Fixed-Period Feedback Control Module
//!
//! A discrete PID evaluator for loops that run at a constant cadence. The
//! sampling interval is fixed when the controller is built, the integral is
//! never clamped and never reset, and the derivative acts on the error. The
//! caller owns saturation.

use crate::pid::Number;
use piddiy::PidController;

/// Control data for the fixed-period feedback compute callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedbackData<T> {
    /// The measured value of the controlled quantity.
    pub current: T,
    /// The sampling interval of the owning loop.
    pub dt: T,
}

/// Fixed-period feedback compute callback.
///
/// Returns `(error, integral, derivative)`; `PidController::compute` stores
/// the error and integral for the next call.
pub fn compute_feedback<T: Number>(
    pid: &mut PidController<T, FeedbackData<T>>,
    data: FeedbackData<T>,
) -> (T, T, T) {
    let error = pid.set_point - data.current;
    let integral = pid.integral + error * data.dt;
    let derivative = (error - pid.error) / data.dt;

    (error, integral, derivative)
}

/// Proportional, integral and derivative gains of one loop edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeedbackGains<T> {
    /// Proportional gain.
    pub kp: T,
    /// Integral gain.
    pub ki: T,
    /// Derivative gain.
    pub kd: T,
}

impl<T: Number> FeedbackGains<T> {
    /// Creates a gain set.
    pub const fn new(kp: T, ki: T, kd: T) -> Self {
        Self { kp, ki, kd }
    }

    /// Creates a proportional-only gain set.
    pub fn proportional(kp: T) -> Self {
        Self::new(kp, T::zero(), T::zero())
    }
}

/// A PID controller evaluated once per period of a fixed-rate loop.
///
/// Each call to [`FeedbackController::output`] both computes the output and
/// advances the integral and previous-error state, so it must run exactly
/// once per period.
pub struct FeedbackController<T: Number> {
    pid: PidController<T, FeedbackData<T>>,
    gains: FeedbackGains<T>,
    dt: T,
}

impl<T: Number> FeedbackController<T> {
    /// Creates a controller for a loop with period `dt`.
    ///
    /// Example Usage
    /// ```
    /// use glider_flight_stabilization::pid::{FeedbackController, FeedbackGains};
    ///
    /// // Rudder angle to duty, run every 50 ms.
    /// let mut rudder_to_duty = FeedbackController::new(FeedbackGains::proportional(3.0f32), 0.05);
    ///
    /// let duty = rudder_to_duty.output(2.0, 12.0);
    /// assert_eq!(30.0, duty);
    /// ```
    pub fn new(gains: FeedbackGains<T>, dt: T) -> Self {
        let mut pid = PidController::new();
        pid.compute_fn(compute_feedback)
            .set_point(T::zero())
            .kp(gains.kp)
            .ki(gains.ki)
            .kd(gains.kd);

        FeedbackController { pid, gains, dt }
    }

    /// Replaces the gains. The integral and previous error are kept.
    pub fn set_gains(&mut self, gains: FeedbackGains<T>) {
        self.pid.kp(gains.kp).ki(gains.ki).kd(gains.kd);
        self.gains = gains;
    }

    /// Current gains.
    pub fn gains(&self) -> FeedbackGains<T> {
        self.gains
    }

    /// Sampling interval fixed at construction.
    pub fn dt(&self) -> T {
        self.dt
    }

    /// Accumulated `error * dt`, before the integral gain is applied.
    pub fn integral(&self) -> T {
        self.pid.integral
    }

    /// Error seen by the most recent evaluation.
    pub fn previous_error(&self) -> T {
        self.pid.error
    }

    /// Evaluates the controller for one period and returns
    /// `Kp * err + Ki * integral + Kd * (err - prev_err) / dt`
    /// with `err = desired - current`.
    pub fn output(&mut self, current: T, desired: T) -> T {
        self.pid.set_point(desired);
        self.pid.compute(FeedbackData {
            current,
            dt: self.dt,
        })
    }
}
