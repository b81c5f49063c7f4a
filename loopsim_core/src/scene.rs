//! Scene composition for the live visualizer.
//!
//! Turns one [`Snapshot`] into world-frame geometry. This is the only place
//! the path-relative transform is applied for drawing, and it is pure: the
//! drawing backend receives a finished [`Scene`] and never sees a snapshot.

use crate::frenet::{
    circle_points, constraint_box, frenet_points_to_world, frenet_to_cartesian,
    frenet_to_cartesian_pts, resample_pose, vehicle_footprint,
};
use crate::messages::Trajectory;
use crate::snapshot::Snapshot;
use nalgebra::Point2;

/// Vertices per obstacle circle.
pub const OBSTACLE_VERTICES: usize = 20;

/// Vertices of the friction-limit circle.
pub const FRICTION_CIRCLE_VERTICES: usize = 100;

/// One obstacle as two concentric outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleOutline {
    pub center: Point2<f64>,
    /// Physical radius outline
    pub body: Vec<Point2<f64>>,
    /// Safety-margin radius outline
    pub margin: Vec<Point2<f64>>,
}

/// Front axle force diagram (second pane).
#[derive(Debug, Clone, PartialEq)]
pub struct ForceDiagram {
    /// `friction_coefficient × front_axle_load` (N)
    pub limit: f64,
    pub friction_circle: Vec<Point2<f64>>,
    /// Candidate trajectory `(Fx, Fy)` points
    pub candidate: Vec<Point2<f64>>,
    /// Selected trajectory `(Fx, Fy)` points
    pub selected: Vec<Point2<f64>>,
}

/// Everything drawn for one frame, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// False when the local path was empty and nothing path-relative could be placed
    pub path_available: bool,
    pub lane_left: Vec<Point2<f64>>,
    pub lane_right: Vec<Point2<f64>>,
    pub obstacles: Vec<ObstacleOutline>,
    pub candidate_points: Vec<Point2<f64>>,
    /// Closed outline per corridor constraint box of the candidate
    pub candidate_corridor: Vec<Vec<Point2<f64>>>,
    pub selected_points: Vec<Point2<f64>>,
    /// Closed vehicle outline
    pub footprint: Vec<Point2<f64>>,
    pub forces: ForceDiagram,
}

impl Scene {
    /// Builds the frame geometry from a snapshot.
    ///
    /// Path-relative items (lanes, obstacles, corridor boxes) are omitted
    /// while the local path is empty.
    pub fn compose(snapshot: &Snapshot) -> Self {
        let path = snapshot.path_local.as_ref();
        let path_available = !path.is_empty();
        
        let lane_left = frenet_to_cartesian_pts(&path.x, &path.y, &path.psi_c, &path.d_left_bound);
        let lane_right = frenet_to_cartesian_pts(&path.x, &path.y, &path.psi_c, &path.d_right_bound);
        
        let obstacles = if path_available {
            let obs = snapshot.obstacles.as_ref();
            (0..obs.len())
                .filter_map(|i| {
                    let pose = resample_pose(path, obs.s[i])?;
                    let center = frenet_to_cartesian(&pose, obs.d[i]);
                    Some(ObstacleOutline {
                        center,
                        body: circle_points(center, obs.radius[i], OBSTACLE_VERTICES),
                        margin: circle_points(center, obs.radius_margin[i], OBSTACLE_VERTICES),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };
        
        let candidate = snapshot.candidate.as_ref();
        let candidate_corridor = if path_available {
            (0..candidate.corridor_len())
                .filter_map(|k| {
                    let outline = constraint_box(
                        candidate.s_lower[k],
                        candidate.s_upper[k],
                        candidate.d_lower[k],
                        candidate.d_upper[k],
                    );
                    frenet_points_to_world(path, &outline)
                })
                .collect()
        } else {
            Vec::new()
        };
        
        let footprint = vehicle_footprint(&snapshot.state, &snapshot.static_params).to_vec();
        
        let limit = snapshot.dynamic_params.friction_limit();
        let forces = ForceDiagram {
            limit,
            friction_circle: circle_points(Point2::origin(), limit, FRICTION_CIRCLE_VERTICES),
            candidate: force_points(candidate),
            selected: force_points(&snapshot.selected),
        };
        
        Self {
            path_available,
            lane_left,
            lane_right,
            obstacles,
            candidate_points: world_points(candidate),
            candidate_corridor,
            selected_points: world_points(&snapshot.selected),
            footprint,
            forces,
        }
    }
}

fn world_points(traj: &Trajectory) -> Vec<Point2<f64>> {
    traj.x
        .iter()
        .zip(&traj.y)
        .map(|(&x, &y)| Point2::new(x, y))
        .collect()
}

fn force_points(traj: &Trajectory) -> Vec<Point2<f64>> {
    traj.front_forces().map(|(fx, fy)| Point2::new(fx, fy)).collect()
}
