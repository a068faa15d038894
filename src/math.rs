//! 2D vector helpers in the left-handed screen frame
//!
//! The arena uses screen coordinates: x grows right, y grows down, and
//! positive rotation is clockwise. Angle helpers negate y before `atan2`
//! so that steering code can reason in the usual counter-clockwise sense.

use glam::DVec2;

/// Normalize to a unit vector; the zero vector maps to itself.
#[inline]
pub fn unit(v: DVec2) -> DVec2 {
    v.normalize_or_zero()
}

/// 2D orthogonal to `v`: a 90 degree rotation in the screen frame.
#[inline]
pub fn orth(v: DVec2) -> DVec2 {
    DVec2::new(v.y, -v.x)
}

/// Rotate `v` by `angle` radians, clockwise-positive.
#[inline]
pub fn rotate(v: DVec2, angle: f64) -> DVec2 {
    let (s, c) = angle.sin_cos();
    DVec2::new(c * v.x + s * v.y, -s * v.x + c * v.y)
}

/// Wrap an angle to [-pi, pi].
///
/// Callers only ever pass values within a few full turns of the range, so
/// the loop is bounded in practice.
#[inline]
pub fn wrap_to_pi(mut x: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    while x > PI {
        x -= TAU;
    }
    while x < -PI {
        x += TAU;
    }
    x
}

/// Angle of `v` relative to `start`, wrapped into [0, 2*pi).
///
/// y is negated because the screen frame is left-handed.
pub fn angle_to(v: DVec2, start: f64) -> f64 {
    use std::f64::consts::TAU;
    let a = (-v.y).atan2(v.x) - start;
    if a < 0.0 { a + TAU } else { a }
}
