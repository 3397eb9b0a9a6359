// src/test_utils.rs

//! Floating point comparison helpers for the unit tests.

/// Absolute tolerance within which two angles, gains or controller outputs
/// are considered equal.
pub const TEST_TOLERANCE: f32 = 1e-5;

/// Checks if two floating point numbers are close enough to be considered
/// equal.
///
/// # Arguments
/// * `target` - The expected value.
/// * `value` - The value under test.
///
/// # Returns
/// `true` if the absolute difference is less than `TEST_TOLERANCE`.
pub fn value_close(target: f32, value: f32) -> bool {
    (target - value).abs() < TEST_TOLERANCE
}

/// Checks if two floating point numbers differ by at least the tolerance.
pub fn value_not_close(target: f32, value: f32) -> bool {
    TEST_TOLERANCE <= (target - value).abs()
}
