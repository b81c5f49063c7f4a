//! loopsim core - snapshot aggregation and geometry for closed-loop
//! trajectory experiments.
//!
//! A coordinator process sits between a set of independent producers (local
//! path, obstacles, candidate and selected trajectories, vehicle state,
//! vehicle parameters) and three consumers (live visualizer, time-series
//! logger, shutdown signal). This crate holds the pieces that do not depend
//! on the run loop:
//!
//! 1. **Messages**: the value records each producer publishes
//! 2. **Snapshot Store**: one last-value-wins slot per channel
//! 3. **Geometry**: path-relative (Frenet) to world transforms
//! 4. **Scene**: world-frame composition of one snapshot for drawing
//! 5. **Configuration** and the **global path** loaded at startup

pub mod messages;
pub mod snapshot;
pub mod frenet;
pub mod scene;
pub mod config;
pub mod path_global;
pub mod error;

// Re-export key types for convenience
pub use config::{ExperimentConfig, ExperimentParams};
pub use error::{ConfigError, PathLoadError};
pub use frenet::{frenet_to_cartesian, frenet_to_cartesian_pts, PathPose};
pub use messages::{
    DynamicVehicleParams, Obstacles, PathLocal, StaticVehicleParams, Trajectory, VehicleState,
};
pub use path_global::GlobalPath;
pub use scene::Scene;
pub use snapshot::{Channel, ChannelUpdate, Provenance, Snapshot, SnapshotStore};
