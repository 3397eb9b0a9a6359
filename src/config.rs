// src/config.rs

//! # Configuration
//!
//! Compile-time defaults for the glider and the configuration structures
//! that carry them into the estimator, the actuator guards, the flight-phase
//! supervisor and the ranging task. Every structure has a `new()` that fills
//! in the defaults below; fields are public so a board can retune them
//! before construction.

use crate::pid::FeedbackGains;
use embassy_time::Duration;

// Task periods
/// Control task period.
pub const CONTROL_PERIOD_MS: u32 = 50;
/// Attitude task period.
pub const ATTITUDE_PERIOD_MS: u64 = 1;
/// Ranging task period.
pub const RANGING_PERIOD_MS: u64 = 100;
/// Motor output task period.
pub const MOTOR_PERIOD_MS: u64 = 50;

// Ranging
/// Distances below this count as near the ground.
pub const NEAR_GROUND_THRESHOLD_CM: f32 = 20.0;
/// An HC-SR04 gives up on an echo after roughly 38 ms.
pub const RANGING_TIMEOUT_MS: u64 = 40;

// Flight phases
/// Continuous time before launch or landing is accepted.
pub const PHASE_DEBOUNCE_MS: u32 = 2_000;
/// Nose-up pitch setpoint near the ground.
pub const FLARE_PITCH_DEG: f32 = 10.0;
/// Pitch setpoint in free flight.
pub const LEVEL_PITCH_DEG: f32 = 0.0;
/// Yaw setpoint.
pub const STRAIGHT_YAW_DEG: f32 = 0.0;

// Control surfaces
/// Largest desired rudder or elevator deflection.
pub const SURFACE_ANGLE_LIMIT_DEG: f32 = 50.0;
/// Pot reading change treated as a glitch.
pub const JUMP_THRESHOLD_DEG: f32 = 30.0;
/// Motor duty saturation in percent.
pub const DUTY_LIMIT: i8 = 100;

// Loop gains (Kp only; Ki and Kd are zero)
/// Yaw error (deg) to desired rudder angle (deg).
pub const KP_YAW_TO_RUDDER: f32 = 1.0;
/// Rudder angle error (deg) to duty (%).
pub const KP_RUDDER_TO_DUTY: f32 = 3.0;
/// Pitch error (deg) to desired elevator angle (deg).
pub const KP_PITCH_TO_ELEVATOR: f32 = 1.0;
/// Elevator angle error (deg) to duty (%).
pub const KP_ELEVATOR_TO_DUTY: f32 = 3.0;

// Attitude fusion
/// Default weight of gyro integration.
pub const GYRO_WEIGHT: f32 = 0.0;
/// Default weight of accelerometer tilt.
pub const ACCEL_WEIGHT: f32 = 1.0;

/// Weights of the complementary blend between gyro integration and
/// accelerometer tilt.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FusionWeights {
    /// Weight of `previous angle + gyro rate * dt`.
    pub gyro: f32,
    /// Weight of the accelerometer tilt angle.
    pub accel: f32,
}

impl FusionWeights {
    /// Accelerometer tilt only; gyro integration disabled.
    pub const fn accel_only() -> Self {
        Self {
            gyro: GYRO_WEIGHT,
            accel: ACCEL_WEIGHT,
        }
    }

    /// Classic 0.98 / 0.02 complementary filter.
    pub const fn complementary() -> Self {
        Self {
            gyro: 0.98,
            accel: 0.02,
        }
    }
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self::accel_only()
    }
}

/// Configuration for the attitude estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EstimatorConfig {
    /// Blend weights for pitch and roll.
    pub weights: FusionWeights,
    /// Pitch reported when the airframe sits level (radians).
    pub pitch_offset: f32,
    /// Roll reported when the airframe sits level (radians).
    pub roll_offset: f32,
}

impl EstimatorConfig {
    /// Creates a configuration with accelerometer-only fusion and no offsets.
    pub const fn new() -> Self {
        Self {
            weights: FusionWeights::accel_only(),
            pitch_offset: 0.0,
            roll_offset: 0.0,
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for one actuator guard.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GuardConfig {
    /// Reading change (degrees) at or above which a sample is rejected.
    pub jump_threshold_deg: f32,
    /// Symmetric duty saturation, in percent.
    pub duty_limit: i8,
}

impl GuardConfig {
    /// Creates the default guard configuration.
    pub const fn new() -> Self {
        Self {
            jump_threshold_deg: JUMP_THRESHOLD_DEG,
            duty_limit: DUTY_LIMIT,
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the flight-phase supervisor and its two cascades.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightPhaseConfig {
    /// Control task period. Also the `dt` of all four loops.
    pub period_ms: u32,
    /// Continuous time required before a phase transition fires.
    pub debounce_ms: u32,
    /// Pitch setpoint while near the ground.
    pub flare_pitch_deg: f32,
    /// Pitch setpoint in free flight.
    pub level_pitch_deg: f32,
    /// Yaw setpoint.
    pub yaw_setpoint_deg: f32,
    /// Saturation of the desired rudder and elevator angles.
    pub surface_angle_limit_deg: f32,
    /// Yaw to desired rudder angle.
    pub yaw_to_rudder: FeedbackGains<f32>,
    /// Rudder angle to rudder duty.
    pub rudder_to_duty: FeedbackGains<f32>,
    /// Pitch to desired elevator angle.
    pub pitch_to_elevator: FeedbackGains<f32>,
    /// Elevator angle to elevator duty.
    pub elevator_to_duty: FeedbackGains<f32>,
    /// Guard settings shared by both surfaces.
    pub guard: GuardConfig,
}

impl FlightPhaseConfig {
    /// Creates the default supervisor configuration.
    pub const fn new() -> Self {
        Self {
            period_ms: CONTROL_PERIOD_MS,
            debounce_ms: PHASE_DEBOUNCE_MS,
            flare_pitch_deg: FLARE_PITCH_DEG,
            level_pitch_deg: LEVEL_PITCH_DEG,
            yaw_setpoint_deg: STRAIGHT_YAW_DEG,
            surface_angle_limit_deg: SURFACE_ANGLE_LIMIT_DEG,
            yaw_to_rudder: FeedbackGains::new(KP_YAW_TO_RUDDER, 0.0, 0.0),
            rudder_to_duty: FeedbackGains::new(KP_RUDDER_TO_DUTY, 0.0, 0.0),
            pitch_to_elevator: FeedbackGains::new(KP_PITCH_TO_ELEVATOR, 0.0, 0.0),
            elevator_to_duty: FeedbackGains::new(KP_ELEVATOR_TO_DUTY, 0.0, 0.0),
            guard: GuardConfig::new(),
        }
    }

    /// Loop period in seconds.
    pub fn dt(&self) -> f32 {
        self.period_ms as f32 / 1000.0
    }
}

impl Default for FlightPhaseConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the ranging task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangingConfig {
    /// Distances strictly below this count as near ground.
    pub near_ground_cm: f32,
    /// Sampling period.
    pub period: Duration,
    /// Longest wait for a single echo.
    pub timeout: Duration,
}

impl RangingConfig {
    /// Creates the default ranging configuration.
    pub const fn new() -> Self {
        Self {
            near_ground_cm: NEAR_GROUND_THRESHOLD_CM,
            period: Duration::from_millis(RANGING_PERIOD_MS),
            timeout: Duration::from_millis(RANGING_TIMEOUT_MS),
        }
    }
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self::new()
    }
}
