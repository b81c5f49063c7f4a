//! Path-relative (Frenet) to world-frame geometry.
//!
//! Every path-relative quantity drawn by the visualizer passes through
//! [`frenet_to_cartesian`]:
//!
//! ```text
//! X = Xc − d · sin(psi_c)
//! Y = Yc + d · cos(psi_c)
//! ```
//!
//! where `(Xc, Yc, psi_c)` is the reference pose sampled at the point's arc
//! length `s`. The vehicle body is the one exception: it is already in world
//! coordinates and only needs a rigid rotation + translation
//! ([`vehicle_footprint`]).

use crate::messages::{PathLocal, StaticVehicleParams, VehicleState};
use nalgebra::{Point2, Rotation2, Vector2};
use std::f64::consts::PI;

/// Extra body length added in front of the front axle and behind the rear
/// axle when drawing the footprint (m).
pub const BODY_OVERHANG: f64 = 0.75;

/// Samples interpolated along each edge of a corridor box.
const BOX_EDGE_SAMPLES: usize = 3;

/// World-frame reference pose on the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPose {
    pub x: f64,
    pub y: f64,
    /// Path heading (rad)
    pub psi: f64,
}

impl PathPose {
    pub fn new(x: f64, y: f64, psi: f64) -> Self {
        Self { x, y, psi }
    }
}

/// A point in path-relative coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrenetPoint {
    /// Arc length (m)
    pub s: f64,
    /// Lateral offset, positive to the left (m)
    pub d: f64,
}

impl FrenetPoint {
    pub fn new(s: f64, d: f64) -> Self {
        Self { s, d }
    }
}

/// Maps a lateral offset from a reference pose to world coordinates.
pub fn frenet_to_cartesian(pose: &PathPose, d: f64) -> Point2<f64> {
    let normal = Vector2::new(-pose.psi.sin(), pose.psi.cos());
    Point2::new(pose.x, pose.y) + normal * d
}

/// Element-wise [`frenet_to_cartesian`] over sampled reference poses.
///
/// `d` broadcasts like an array operand: a single element applies to every
/// pose, otherwise it is paired index by index. Output length is the
/// shortest of the paired inputs.
pub fn frenet_to_cartesian_pts(xc: &[f64], yc: &[f64], psi_c: &[f64], d: &[f64]) -> Vec<Point2<f64>> {
    let poses = xc
        .iter()
        .zip(yc)
        .zip(psi_c)
        .map(|((&x, &y), &psi)| PathPose::new(x, y, psi));
    
    match d {
        [] => Vec::new(),
        [offset] => poses.map(|pose| frenet_to_cartesian(&pose, *offset)).collect(),
        offsets => poses
            .zip(offsets)
            .map(|(pose, &offset)| frenet_to_cartesian(&pose, offset))
            .collect(),
    }
}

/// One-dimensional linear interpolation with end clamping.
///
/// `xp` must be increasing. Queries left of the domain return `fp[0]`,
/// right of it the last value. Returns `None` when the domain is empty or
/// the samples bracketing `x` are not finite and increasing.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> Option<f64> {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return None;
    }
    if x.is_nan() {
        return Some(f64::NAN);
    }
    if x <= xp[0] {
        return Some(fp[0]);
    }
    if x >= xp[n - 1] {
        return Some(fp[n - 1]);
    }
    
    // xp[i - 1] <= x < xp[i]
    let i = xp[..n].partition_point(|&v| v <= x);
    if i == 0 || i >= n {
        return None;
    }
    let (x0, x1) = (xp[i - 1], xp[i]);
    if !(x0.is_finite() && x1.is_finite() && x0 < x1) {
        return None;
    }
    let (f0, f1) = (fp[i - 1], fp[i]);
    Some(f0 + (f1 - f0) * (x - x0) / (x1 - x0))
}

/// Reference pose at arc length `s`, linearly interpolated over the path.
///
/// Returns `None` for an empty path (no interpolation domain).
pub fn resample_pose(path: &PathLocal, s: f64) -> Option<PathPose> {
    let n = path.len();
    let domain = &path.s[..n];
    Some(PathPose {
        x: interp(s, domain, &path.x[..n])?,
        y: interp(s, domain, &path.y[..n])?,
        psi: interp(s, domain, &path.psi_c[..n])?,
    })
}

/// Maps path-relative points to world coordinates via [`resample_pose`].
pub fn frenet_points_to_world(path: &PathLocal, points: &[FrenetPoint]) -> Option<Vec<Point2<f64>>> {
    points
        .iter()
        .map(|p| resample_pose(path, p.s).map(|pose| frenet_to_cartesian(&pose, p.d)))
        .collect()
}

/// `n` vertices of a circle, starting at angle −π and stepping 2π/n.
pub fn circle_points(center: Point2<f64>, radius: f64, n: usize) -> Vec<Point2<f64>> {
    let step = 2.0 * PI / n as f64;
    (0..n)
        .map(|k| {
            let t = -PI + k as f64 * step;
            center + Vector2::new(t.cos(), t.sin()) * radius
        })
        .collect()
}

fn linspace(a: f64, b: f64, n: usize) -> impl Iterator<Item = f64> {
    let last = (n.max(2) - 1) as f64;
    (0..n).map(move |k| a + (b - a) * k as f64 / last)
}

/// Closed perimeter of a corridor constraint box in path-relative
/// coordinates.
///
/// Walks upper-s edge, lower-d edge, lower-s edge, upper-d edge with
/// [`BOX_EDGE_SAMPLES`] points per edge, so the last point coincides with
/// the first.
pub fn constraint_box(s_lower: f64, s_upper: f64, d_lower: f64, d_upper: f64) -> Vec<FrenetPoint> {
    let n = BOX_EDGE_SAMPLES;
    let edges = [
        ((s_upper, s_upper), (d_upper, d_lower)),
        ((s_upper, s_lower), (d_lower, d_lower)),
        ((s_lower, s_lower), (d_lower, d_upper)),
        ((s_lower, s_upper), (d_upper, d_upper)),
    ];
    
    edges
        .into_iter()
        .flat_map(|((s0, s1), (d0, d1))| {
            linspace(s0, s1, n)
                .zip(linspace(d0, d1, n))
                .map(|(s, d)| FrenetPoint::new(s, d))
        })
        .collect()
}

/// Closed 5-point outline of the vehicle body in world coordinates.
pub fn vehicle_footprint(state: &VehicleState, params: &StaticVehicleParams) -> [Point2<f64>; 5] {
    let front = params.length_front_offset + BODY_OVERHANG;
    let rear = params.length_rear_offset + BODY_OVERHANG;
    let half_width = params.width / 2.0;
    
    let rotation = Rotation2::new(state.psi);
    let origin = Vector2::new(state.x, state.y);
    
    [
        (front, half_width),
        (-rear, half_width),
        (-rear, -half_width),
        (front, -half_width),
        (front, half_width),
    ]
    .map(|(lx, ly)| Point2::from(rotation * Vector2::new(lx, ly) + origin))
}
