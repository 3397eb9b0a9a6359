// src/error.rs

//! Error types shared by the sensor tasks.
//!
//! Only the inertial sensor initialization failure is fatal. Every other
//! variant describes a transient fault that a task logs and rides out on its
//! next period.

use thiserror::Error;

/// Errors surfaced by the flight core and its task bodies.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The inertial sensor did not respond during startup. Attitude data
    /// would be unverified, so dependent control loops must not start.
    #[error("inertial sensor initialization failed")]
    InertialInit,

    /// A periodic accelerometer/gyroscope read failed.
    #[error("inertial sensor read failed")]
    InertialRead,

    /// A periodic magnetometer read failed.
    #[error("magnetometer read failed")]
    MagnetometerRead,

    /// The ranging sensor returned an error instead of a distance.
    #[error("ranging sensor read failed")]
    RangingRead,

    /// The ranging echo did not arrive before the configured deadline.
    #[error("ranging sensor timed out")]
    RangingTimeout,
}

impl Error {
    /// Returns `true` for faults that must stop the owning task at startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InertialInit)
    }
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;
