//! Signed 8.8 fixed-point arithmetic for per-cell velocities.
//!
//! One sign bit, 7 integer bits, 8 fractional bits, giving roughly ±128
//! cells/tick of range at 1/256 resolution. Only the velocity integration
//! hot path uses fixed point; thermal math and probabilities stay in f32.

/// A velocity component in signed 8.8 fixed point.
pub type Fixed8 = i16;

pub const FIXED_SHIFT: u32 = 8;
pub const FIXED_ONE: i32 = 1 << FIXED_SHIFT;

/// Convert a float to 8.8 fixed point, rounding to the nearest step.
#[inline]
pub fn to_fixed(x: f32) -> Fixed8 {
    (x * FIXED_ONE as f32).round() as Fixed8
}

/// Convert 8.8 fixed point back to a float.
#[inline]
pub fn to_float(q: Fixed8) -> f32 {
    q as f32 / FIXED_ONE as f32
}

/// Fixed-point multiply with a 32-bit intermediate.
#[inline]
pub fn mul(a: Fixed8, b: Fixed8) -> Fixed8 {
    ((a as i32 * b as i32) >> FIXED_SHIFT) as Fixed8
}

/// Whole-cell magnitude of a fixed-point velocity.
#[inline]
pub fn whole_cells(q: Fixed8) -> i32 {
    (q.unsigned_abs() as i32) >> FIXED_SHIFT
}
