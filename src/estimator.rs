// src/estimator.rs

//! # Attitude Estimation Module
//!
//! Pitch and roll come from the direction of gravity in the accelerometer,
//! optionally blended with integrated gyro rates, and are rounded to whole
//! degrees. Yaw is the heading of the magnetometer after the reading has been
//! tilt compensated with the pitch and roll of the same tick.
//!
//! The blend is `w_gyro * (previous + rate * dt) + w_accel * tilt`. With the
//! default weights (0, 1) gyro integration is switched off entirely.

use crate::config::{EstimatorConfig, FusionWeights};
use embassy_time::Instant;
use num_traits::Float;

/// Orientation of the glider in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attitude {
    /// Nose up is positive.
    pub pitch: f32,
    /// Rotation about the longitudinal axis.
    pub roll: f32,
    /// Heading relative to the zeroed direction.
    pub yaw: f32,
}

impl Attitude {
    /// Level attitude pointing along the zero heading.
    pub const fn level() -> Self {
        Self {
            pitch: 0.0,
            roll: 0.0,
            yaw: 0.0,
        }
    }

    /// Pitch in degrees.
    pub fn pitch_deg(&self) -> f32 {
        self.pitch.to_degrees()
    }

    /// Roll in degrees.
    pub fn roll_deg(&self) -> f32 {
        self.roll.to_degrees()
    }

    /// Yaw in degrees.
    pub fn yaw_deg(&self) -> f32 {
        self.yaw.to_degrees()
    }
}

/// One accelerometer and gyroscope sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuSample {
    /// Acceleration along x, y, z in m/s².
    pub accel: [f32; 3],
    /// Angular rate about x, y, z in rad/s.
    pub gyro: [f32; 3],
}

/// One raw magnetometer sample, not tilt compensated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagSample {
    /// Field along x in sensor counts.
    pub x: f32,
    /// Field along y in sensor counts.
    pub y: f32,
    /// Field along z in sensor counts.
    pub z: f32,
}

/// Rounds an angle to the nearest whole degree.
pub fn round_to_degree(angle: f32) -> f32 {
    angle.to_degrees().round().to_radians()
}

/// Tilt of the x axis against gravity.
fn tilt_x(accel: [f32; 3]) -> f32 {
    let [ax, ay, az] = accel;
    ax.atan2((ay * ay + az * az).sqrt())
}

/// Tilt of the y axis against gravity.
fn tilt_y(accel: [f32; 3]) -> f32 {
    let [ax, ay, az] = accel;
    ay.atan2((ax * ax + az * az).sqrt())
}

/// Heading of a magnetometer reading compensated for pitch and roll.
pub fn tilt_compensated_heading(mag: MagSample, pitch: f32, roll: f32) -> f32 {
    let (sin_pitch, cos_pitch) = (pitch.sin(), pitch.cos());
    let sin_roll = roll.sin();

    let n_mag_x = mag.x * cos_pitch + mag.z * sin_pitch;
    let n_mag_y = mag.x * sin_roll * sin_pitch + mag.z * sin_roll * cos_pitch;

    (-n_mag_y).atan2(n_mag_x)
}

/// Attitude estimator holding the running estimate between ticks.
#[derive(Debug, Clone)]
pub struct AttitudeEstimator {
    weights: FusionWeights,
    pitch_offset: f32,
    roll_offset: f32,
    yaw_offset: f32,
    attitude: Attitude,
    heading: f32,
    last_time: Option<Instant>,
}

impl AttitudeEstimator {
    /// Creates an estimator using the provided configuration.
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self {
            weights: config.weights,
            pitch_offset: config.pitch_offset,
            roll_offset: config.roll_offset,
            yaw_offset: 0.0,
            attitude: Attitude::level(),
            heading: 0.0,
            last_time: None,
        }
    }

    /// Creates an estimator with default settings.
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::new())
    }

    /// Latest estimate.
    pub fn attitude(&self) -> Attitude {
        self.attitude
    }

    /// Whether a first timestamp has been recorded.
    pub fn is_primed(&self) -> bool {
        self.last_time.is_some()
    }

    /// Fusion weights in use.
    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Replaces the fusion weights.
    pub fn set_weights(&mut self, weights: FusionWeights) {
        self.weights = weights;
    }

    /// Replaces the level pitch and roll offsets (radians).
    pub fn set_tilt_offsets(&mut self, pitch: f32, roll: f32) {
        self.pitch_offset = pitch;
        self.roll_offset = roll;
    }

    /// Offset currently subtracted from the heading (radians).
    pub fn yaw_offset(&self) -> f32 {
        self.yaw_offset
    }

    /// Takes the current heading as the new zero yaw.
    pub fn zero(&mut self) {
        self.yaw_offset = self.heading;
        self.attitude.yaw = self.heading - self.yaw_offset;
    }

    /// Advances the estimate to `now`.
    ///
    /// The first call only records the timestamp and returns `None`.
    pub fn update(&mut self, now: Instant, imu: ImuSample, mag: MagSample) -> Option<Attitude> {
        let Some(last) = self.last_time.replace(now) else {
            return None;
        };
        let dt = now.saturating_duration_since(last).as_micros() as f32 / 1_000_000.0;

        let [gyro_x, gyro_y, _] = imu.gyro;
        let FusionWeights { gyro, accel } = self.weights;

        let pitch = round_to_degree(
            gyro * (self.attitude.pitch + gyro_x * dt) + accel * tilt_x(imu.accel)
                - self.pitch_offset,
        );
        let roll = round_to_degree(
            gyro * (self.attitude.roll + gyro_y * dt) + accel * tilt_y(imu.accel)
                - self.roll_offset,
        );

        self.heading = tilt_compensated_heading(mag, pitch, roll);
        self.attitude = Attitude {
            pitch,
            roll,
            yaw: self.heading - self.yaw_offset,
        };

        Some(self.attitude)
    }
}

impl Default for AttitudeEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use core::f32::consts::{FRAC_PI_4, PI};

    const GRAVITY: f32 = 9.80665;

    fn level_imu() -> ImuSample {
        ImuSample {
            accel: [0.0, 0.0, GRAVITY],
            gyro: [0.0; 3],
        }
    }

    fn tilted_imu(gyro: [f32; 3]) -> ImuSample {
        // x axis pitched up by 30 degrees
        let angle = 30.0f32.to_radians();
        ImuSample {
            accel: [GRAVITY * angle.sin(), 0.0, GRAVITY * angle.cos()],
            gyro,
        }
    }

    fn mag() -> MagSample {
        MagSample {
            x: 0.3,
            y: -0.1,
            z: 0.4,
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    /// Test that the first tick only records the timestamp.
    #[test]
    fn test_estimator_first_tick_is_skipped() {
        let mut estimator = AttitudeEstimator::new();
        assert!(!estimator.is_primed());

        assert_eq!(None, estimator.update(at(10), tilted_imu([0.0; 3]), mag()));
        assert!(estimator.is_primed());
        assert_eq!(Attitude::level(), estimator.attitude());

        assert!(estimator.update(at(11), tilted_imu([0.0; 3]), mag()).is_some());
    }

    /// Test that a level airframe reads zero pitch and roll.
    #[test]
    fn test_estimator_level() {
        let mut estimator = AttitudeEstimator::new();
        let _ = estimator.update(at(0), level_imu(), mag());
        let attitude = estimator.update(at(1), level_imu(), mag()).unwrap();

        assert!(value_close(0.0, attitude.pitch));
        assert!(value_close(0.0, attitude.roll));
    }

    /// Test that pitch depends only on accelerometer tilt when gyro weight is 0.
    #[test]
    fn test_estimator_accel_only_ignores_gyro() {
        let mut still = AttitudeEstimator::new();
        let mut spinning = AttitudeEstimator::new();

        let _ = still.update(at(0), tilted_imu([0.0; 3]), mag());
        let _ = spinning.update(at(0), tilted_imu([5.0, -3.0, 1.0]), mag());

        for ms in 1..20 {
            let a = still.update(at(ms * 10), tilted_imu([0.0; 3]), mag()).unwrap();
            let b = spinning
                .update(at(ms * 10), tilted_imu([5.0, -3.0, 1.0]), mag())
                .unwrap();
            assert!(value_close(a.pitch, b.pitch), "Gyro must not move pitch.");
            assert!(value_close(a.roll, b.roll), "Gyro must not move roll.");
            assert!(value_close(30.0f32.to_radians(), a.pitch));
        }
    }

    /// Test that pitch and roll are rounded to whole degrees.
    #[test]
    fn test_estimator_rounds_to_degree() {
        let angle = 12.4f32.to_radians();
        let imu = ImuSample {
            accel: [GRAVITY * angle.sin(), 0.0, GRAVITY * angle.cos()],
            gyro: [0.0; 3],
        };
        let mut estimator = AttitudeEstimator::new();
        let _ = estimator.update(at(0), imu, mag());
        let attitude = estimator.update(at(1), imu, mag()).unwrap();

        assert!(value_close(12.0f32.to_radians(), attitude.pitch));
        assert!(value_close(round_to_degree(PI / 3.0), 60.0f32.to_radians()));
    }

    /// Test gyro integration with the complementary weighting.
    #[test]
    fn test_estimator_gyro_integration() {
        let mut estimator = AttitudeEstimator::with_config(EstimatorConfig {
            weights: FusionWeights { gyro: 1.0, accel: 0.0 },
            ..EstimatorConfig::new()
        });
        let spin = ImuSample {
            accel: [0.0, 0.0, GRAVITY],
            gyro: [0.2, 0.0, 0.0],
        };

        let _ = estimator.update(at(0), spin, mag());
        let first = estimator.update(at(500), spin, mag()).unwrap();
        assert!(value_close(round_to_degree(0.1), first.pitch));

        let second = estimator.update(at(1000), spin, mag()).unwrap();
        assert!(value_close(round_to_degree(first.pitch + 0.1), second.pitch));
        assert!(value_close(0.0, second.roll));
    }

    /// Test that the configured pitch offset is removed before rounding.
    #[test]
    fn test_estimator_pitch_offset() {
        let mut estimator = AttitudeEstimator::with_config(EstimatorConfig {
            pitch_offset: 30.0f32.to_radians(),
            ..EstimatorConfig::new()
        });
        let _ = estimator.update(at(0), tilted_imu([0.0; 3]), mag());
        let attitude = estimator.update(at(1), tilted_imu([0.0; 3]), mag()).unwrap();
        assert!(value_close(0.0, attitude.pitch));

        estimator.set_tilt_offsets(0.0, 0.0);
        let attitude = estimator.update(at(2), tilted_imu([0.0; 3]), mag()).unwrap();
        assert!(value_close(30.0f32.to_radians(), attitude.pitch));
    }

    /// Test the tilt compensation formula on a level airframe.
    #[test]
    fn test_heading_level() {
        // Level: nMagX = x, nMagY = 0, heading = atan2(-0, x)
        let heading = tilt_compensated_heading(mag(), 0.0, 0.0);
        assert!(value_close(0.0, heading));

        let heading = tilt_compensated_heading(
            MagSample {
                x: -1.0,
                y: 0.0,
                z: 0.0,
            },
            0.0,
            0.0,
        );
        assert!(value_close(PI, heading.abs()));
    }

    /// Test the tilt compensation formula with pitch and roll.
    #[test]
    fn test_heading_tilted() {
        let sample = MagSample {
            x: 1.0,
            y: 0.0,
            z: 1.0,
        };
        let pitch = FRAC_PI_4;
        let roll = FRAC_PI_4;
        let n_x = pitch.cos() + pitch.sin();
        let n_y = roll.sin() * pitch.sin() + roll.sin() * pitch.cos();

        let heading = tilt_compensated_heading(sample, pitch, roll);
        assert!(value_close((-n_y).atan2(n_x), heading));
    }

    /// Test that zeroing makes the next yaw from unchanged inputs exactly 0.
    #[test]
    fn test_estimator_zero_yaw() {
        // Pitched and rolled so the heading is not trivially zero.
        let imu = ImuSample {
            accel: [3.0, 2.0, 8.0],
            gyro: [0.0; 3],
        };
        let mut estimator = AttitudeEstimator::new();
        let _ = estimator.update(at(0), imu, mag());
        let before = estimator.update(at(1), imu, mag()).unwrap();
        assert!(value_not_close(0.0, before.yaw));

        estimator.zero();
        assert!(value_close(before.yaw, estimator.yaw_offset()));
        let after = estimator.update(at(2), imu, mag()).unwrap();
        assert!(value_close(0.0, after.yaw), "Yaw should be zero after zero().");

        // Zeroing twice in a row must not drift.
        estimator.zero();
        let again = estimator.update(at(3), imu, mag()).unwrap();
        assert!(value_close(0.0, again.yaw));
    }
}
