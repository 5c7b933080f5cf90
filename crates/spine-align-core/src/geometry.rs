//! Angle and distance primitives on image-space points.
//!
//! Points are pixel coordinates with `y` growing downward, so a positive
//! `atan2` angle points "down" on the film. Angles are returned in degrees
//! unless the function name says otherwise. Every function is total: finite
//! inputs never produce a panic, and coincident points resolve through
//! `atan2(0, 0) = 0`.

use nalgebra::{Point2, Rotation2};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Segments shorter than this (in pixels) carry no usable direction.
pub const DEGENERATE_EPS_PX: f64 = 1e-6;

/// Signed direction of `p1 -> p2` in degrees, `(-180, 180]`.
#[inline]
pub fn direction_deg(p1: Point2<f64>, p2: Point2<f64>) -> f64 {
    let d = p2 - p1;
    d.y.atan2(d.x).to_degrees()
}

/// Wrap an angle in degrees to `(-180, 180]`.
#[inline]
pub fn wrap_deg(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

#[inline]
fn wrap_rad(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Angle of a line to the horizontal, `[0, 180]`.
#[inline]
pub fn line_angle(p1: Point2<f64>, p2: Point2<f64>) -> f64 {
    direction_deg(p1, p2).abs()
}

/// Angle of a line to the vertical, `[-90, 90]`.
///
/// This is the complement of [`line_angle`]: the two always sum to 90°.
/// Lines that lean past the vertical come out negative.
#[inline]
pub fn angle_to_vertical(p1: Point2<f64>, p2: Point2<f64>) -> f64 {
    90.0 - line_angle(p1, p2)
}

/// Unsigned Cobb angle between line `a1 -> a2` and line `b1 -> b2`, `[0, 180]`.
pub fn cobb_angle(a1: Point2<f64>, a2: Point2<f64>, b1: Point2<f64>, b2: Point2<f64>) -> f64 {
    let mut diff = (direction_deg(a1, a2) - direction_deg(b1, b2)).abs();
    if diff > 180.0 {
        diff = 360.0 - diff;
    }
    diff
}

/// Signed Cobb angle `θa − θb`, wrapped to `(-180, 180]`.
///
/// The sign follows the point order of both lines, so callers must pass
/// endplates in a fixed anatomical order (anterior first). The magnitude is
/// always equal to [`cobb_angle`].
pub fn signed_cobb_angle(
    a1: Point2<f64>,
    a2: Point2<f64>,
    b1: Point2<f64>,
    b2: Point2<f64>,
) -> f64 {
    wrap_deg(direction_deg(a1, a2) - direction_deg(b1, b2))
}

/// Direction perpendicular to an endplate line, in radians.
#[inline]
pub fn perpendicular_angle(p1: Point2<f64>, p2: Point2<f64>) -> f64 {
    let d = p2 - p1;
    d.y.atan2(d.x) - FRAC_PI_2
}

#[inline]
pub fn midpoint(p1: Point2<f64>, p2: Point2<f64>) -> Point2<f64> {
    nalgebra::center(&p1, &p2)
}

#[inline]
pub fn distance(p1: Point2<f64>, p2: Point2<f64>) -> f64 {
    nalgebra::distance(&p1, &p2)
}

/// Pelvic incidence: angle between the S1 endplate perpendicular and the line
/// from the S1 midpoint to the hip center, `[0, 180]`.
pub fn compute_pi(s1_ant: Point2<f64>, s1_post: Point2<f64>, hip_center: Point2<f64>) -> f64 {
    let s1_mid = midpoint(s1_ant, s1_post);
    let perp = perpendicular_angle(s1_ant, s1_post);
    let to_hip = hip_center - s1_mid;
    let hip_angle = to_hip.y.atan2(to_hip.x);
    wrap_rad(perp - hip_angle).abs().to_degrees()
}

/// Pelvic tilt: angle of the hip-center → S1-midpoint line to the vertical.
///
/// Only the magnitude of the horizontal offset enters, so mirroring the hip
/// center across the vertical through `s1_mid` gives the same tilt.
pub fn compute_pt(s1_mid: Point2<f64>, hip_center: Point2<f64>) -> f64 {
    let dx = s1_mid.x - hip_center.x;
    let dy = hip_center.y - s1_mid.y;
    dx.abs().atan2(dy).to_degrees()
}

/// Rotate `p` about `pivot` by `angle_rad`.
///
/// In image coordinates a positive angle increases the `atan2` direction of
/// `p − pivot`, i.e. turns clockwise on screen.
#[inline]
pub fn rotate_about(p: Point2<f64>, pivot: Point2<f64>, angle_rad: f64) -> Point2<f64> {
    pivot + Rotation2::new(angle_rad) * (p - pivot)
}

/// True when the segment has no usable direction.
pub fn is_degenerate_segment(p1: Point2<f64>, p2: Point2<f64>) -> bool {
    let finite = p1.x.is_finite() && p1.y.is_finite() && p2.x.is_finite() && p2.y.is_finite();
    !finite || distance(p1, p2) < DEGENERATE_EPS_PX
}
