// src/lib.rs

//! # Glider Flight Stabilization
//!
//! This crate provides the `no_std`, no-alloc flight core of an unpowered
//! glider that holds a straight, level glide and flares for a soft landing.
//! It estimates attitude from an inertial sensor and a magnetometer, turns the
//! estimate into rudder and elevator angles through cascaded PID loops, and
//! drives the two motorized control surfaces while a flight-phase state
//! machine decides when the cascades may run.
//!
//! ## Layout
//!
//! - [`pid`]: the feedback controller reused on all four loop edges.
//! - [`estimator`]: complementary-filter-style attitude estimation.
//! - [`guard`]: angle to duty conversion with jump rejection and saturation.
//! - [`phase`]: the DISABLED / WAIT_FOR_LAUNCH / ACTIVE supervisor.
//! - [`shares`]: most-recent-value cells shared between tasks.
//! - [`sensors`]: traits for the hardware collaborators and small drivers.
//! - [`tasks`]: periodic task bodies for an async executor.

#![no_std]
#![deny(missing_docs)]

// This must go first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod estimator;
pub mod guard;
pub mod phase;
pub mod pid;
pub mod sensors;
pub mod shares;
pub mod tasks;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use estimator::{Attitude, AttitudeEstimator};
#[doc(inline)]
pub use guard::{ActuatorGuard, SurfaceCommand};
#[doc(inline)]
pub use phase::{FlightPhase, FlightPhaseController};
#[doc(inline)]
pub use pid::{FeedbackController, FeedbackGains};
#[doc(inline)]
pub use shares::{SharedCell, Shares};

#[cfg(test)]
mod test_utils;
