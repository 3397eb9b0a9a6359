// src/pid.rs

//! # PID Control Module
//!
//! This module provides the compute callback, control data structure and
//! controller wrapper used for every loop edge of the rudder and elevator
//! cascades.

pub mod feedback;
pub use feedback::*;

pub use piddiy::Number;
