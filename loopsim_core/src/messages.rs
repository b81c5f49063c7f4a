//! Message shapes delivered by the external producers.
//!
//! Every type is a plain value record. The snapshot store owns exactly one
//! instance of each and replaces it wholesale on every update; nothing in
//! this crate mutates a message field by field.

use serde::{Deserialize, Serialize};

/// Sampled local reference path around the vehicle.
///
/// All sequences are co-indexed by arc length and `s` is strictly
/// increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathLocal {
    /// Arc length along the path (m)
    pub s: Vec<f64>,
    /// World X of the centerline (m)
    pub x: Vec<f64>,
    /// World Y of the centerline (m)
    pub y: Vec<f64>,
    /// Heading of the centerline (rad)
    pub psi_c: Vec<f64>,
    /// Lateral offset of the left lane boundary (m)
    pub d_left_bound: Vec<f64>,
    /// Lateral offset of the right lane boundary (m)
    pub d_right_bound: Vec<f64>,
}

impl PathLocal {
    /// Number of usable co-indexed samples.
    pub fn len(&self) -> usize {
        [
            self.s.len(),
            self.x.len(),
            self.y.len(),
            self.psi_c.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
    
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Obstacles detected at the current tick, in path-relative coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Obstacles {
    pub s: Vec<f64>,
    pub d: Vec<f64>,
    /// Physical radius (m)
    pub radius: Vec<f64>,
    /// Radius including the safety margin (m)
    pub radius_margin: Vec<f64>,
}

impl Obstacles {
    /// Number of complete obstacle entries.
    pub fn len(&self) -> usize {
        [
            self.s.len(),
            self.d.len(),
            self.radius.len(),
            self.radius_margin.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
    
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A trajectory produced by the planner.
///
/// Two instances travel on separate channels: the candidate (before
/// optimization) and the selected one (after).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub s: Vec<f64>,
    pub d: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Corridor constraint box, longitudinal lower bound
    pub s_lower: Vec<f64>,
    /// Corridor constraint box, longitudinal upper bound
    pub s_upper: Vec<f64>,
    /// Corridor constraint box, lateral lower bound
    pub d_lower: Vec<f64>,
    /// Corridor constraint box, lateral upper bound
    pub d_upper: Vec<f64>,
    /// Front axle longitudinal force (N)
    pub fx_front: Vec<f64>,
    /// Front axle lateral force (N)
    pub fy_front: Vec<f64>,
}

impl Trajectory {
    /// Number of trajectory points with a world position.
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }
    
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    
    /// Number of complete corridor boxes.
    pub fn corridor_len(&self) -> usize {
        [
            self.s_lower.len(),
            self.s_upper.len(),
            self.d_lower.len(),
            self.d_upper.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
    
    /// Front axle force pairs `(Fx, Fy)`.
    pub fn front_forces(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.fx_front.iter().copied().zip(self.fy_front.iter().copied())
    }
}

/// Instantaneous vehicle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    /// Heading (rad)
    pub psi: f64,
    pub s: f64,
    pub d: f64,
    /// Heading relative to the path (rad)
    pub delta_psi: f64,
    /// Yaw rate (rad/s)
    pub psi_dot: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,
    pub stop_flag: bool,
}

/// Fixed vehicle geometry, constant for the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticVehicleParams {
    /// Distance from the reference point to the front axle (m)
    pub length_front_offset: f64,
    /// Distance from the reference point to the rear axle (m)
    pub length_rear_offset: f64,
    /// Body width (m)
    pub width: f64,
}

/// Time-varying physical limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicVehicleParams {
    pub friction_coefficient: f64,
    /// Normal load on the front axle (N)
    pub front_axle_load: f64,
}

impl DynamicVehicleParams {
    /// Radius of the front axle friction circle (N).
    pub fn friction_limit(&self) -> f64 {
        self.friction_coefficient * self.front_axle_load
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_defaults_are_zero_valued() {
        assert!(PathLocal::default().is_empty());
        assert!(Obstacles::default().is_empty());
        assert!(Trajectory::default().is_empty());
        assert_eq!(VehicleState::default().vx, 0.0);
        assert!(!VehicleState::default().stop_flag);
        assert_eq!(DynamicVehicleParams::default().friction_limit(), 0.0);
    }
    
    #[test]
    fn test_len_uses_shortest_sequence() {
        let obstacles = Obstacles {
            s: vec![1.0, 2.0, 3.0],
            d: vec![0.0, 0.5],
            radius: vec![1.0, 1.0, 1.0],
            radius_margin: vec![1.5, 1.5, 1.5],
        };
        assert_eq!(obstacles.len(), 2);
    }
    
    #[test]
    fn test_friction_limit() {
        let dp = DynamicVehicleParams {
            friction_coefficient: 0.8,
            front_axle_load: 5000.0,
        };
        assert!((dp.friction_limit() - 4000.0).abs() < 1e-9);
    }
    
    #[test]
    fn test_vehicle_state_json_shape() {
        let json = r#"{"x":1.0,"y":2.0,"psi":0.1,"s":3.0,"d":0.2,"delta_psi":0.0,
            "psi_dot":0.0,"vx":10.0,"vy":0.0,"ax":0.0,"ay":0.0,"stop_flag":false}"#;
        let state: VehicleState = serde_json::from_str(json).unwrap();
        assert_eq!(state.vx, 10.0);
    }
}
