//! Rerun live visualization of the experiment.
//!
//! Visualization is optional and only available with the `visualization`
//! feature. Each frame redraws two panes from a composed [`Scene`]:
//!
//! - `scene/*`: lane boundaries, obstacles (body + margin circles), the
//!   candidate trajectory with its corridor boxes, the selected trajectory
//!   and the vehicle outline
//! - `forces/*`: the front axle friction circle with the candidate and
//!   selected `(Fx, Fy)` points

use loopsim_core::Scene;
use loopsim_env::SimTime;
use thiserror::Error;

#[cfg(feature = "visualization")]
use nalgebra::Point2;
#[cfg(feature = "visualization")]
use rerun::{Color, LineStrips2D, Points2D, Radius, RecordingStream};

/// A frame could not be drawn. The run continues without it.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render backend error: {0}")]
    Backend(String),
}

/// Something that can draw one composed frame.
pub trait FrameRenderer: Send {
    /// Draws the scene for simulated time `time`.
    fn render(&mut self, time: SimTime, scene: &Scene) -> Result<(), RenderError>;
}

/// Rerun-backed live visualizer.
pub struct LiveVisualizer {
    #[cfg(feature = "visualization")]
    rec: Option<RecordingStream>,
    
    /// Whether visualization is enabled
    enabled: bool,
}

impl LiveVisualizer {
    /// Creates a new visualizer with drawing disabled.
    pub fn disabled() -> Self {
        Self {
            #[cfg(feature = "visualization")]
            rec: None,
            enabled: false,
        }
    }
    
    /// Creates a visualizer and spawns the Rerun viewer.
    ///
    /// Falls back to disabled if the viewer cannot be started.
    #[cfg(feature = "visualization")]
    pub fn new(name: &str) -> Self {
        match rerun::RecordingStreamBuilder::new(name).spawn() {
            Ok(rec) => {
                tracing::info!("Rerun visualization enabled - open Rerun Viewer to follow the run");
                Self {
                    rec: Some(rec),
                    enabled: true,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to initialize Rerun: {:?}", e);
                Self::disabled()
            }
        }
    }
    
    /// Creates a visualizer - returns disabled if visualization feature not enabled.
    #[cfg(not(feature = "visualization"))]
    pub fn new(_name: &str) -> Self {
        tracing::warn!("Rerun visualization not available (compile with --features visualization)");
        Self::disabled()
    }
    
    /// Returns whether visualization is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl FrameRenderer for LiveVisualizer {
    #[cfg(feature = "visualization")]
    fn render(&mut self, time: SimTime, scene: &Scene) -> Result<(), RenderError> {
        match self.rec {
            Some(ref rec) => draw(rec, time, scene).map_err(|e| RenderError::Backend(e.to_string())),
            None => Ok(()),
        }
    }
    
    #[cfg(not(feature = "visualization"))]
    fn render(&mut self, _time: SimTime, _scene: &Scene) -> Result<(), RenderError> {
        Ok(())
    }
}

#[cfg(feature = "visualization")]
fn strip(points: &[Point2<f64>]) -> Vec<[f32; 2]> {
    points.iter().map(|p| [p.x as f32, p.y as f32]).collect()
}

/// Like [`strip`], repeating the first vertex at the end.
#[cfg(feature = "visualization")]
fn closed_strip(points: &[Point2<f64>]) -> Vec<[f32; 2]> {
    let mut out = strip(points);
    if let Some(&first) = out.first() {
        out.push(first);
    }
    out
}

#[cfg(feature = "visualization")]
fn draw(rec: &RecordingStream, time: SimTime, scene: &Scene) -> Result<(), rerun::RecordingStreamError> {
    let black = Color::from_rgb(0, 0, 0);
    let red = Color::from_rgb(220, 40, 40);
    let blue = Color::from_rgb(40, 80, 230);
    let magenta = Color::from_rgb(200, 0, 200);
    
    rec.set_time_seconds("sim_time", time.as_secs_f64());
    
    // Planar scene
    rec.log(
        "scene/lanes",
        &LineStrips2D::new([strip(&scene.lane_left), strip(&scene.lane_right)]).with_colors([black]),
    )?;
    rec.log(
        "scene/obstacles",
        &LineStrips2D::new(
            scene
                .obstacles
                .iter()
                .flat_map(|o| [closed_strip(&o.margin), closed_strip(&o.body)]),
        )
        .with_colors([red]),
    )?;
    rec.log(
        "scene/candidate/points",
        &Points2D::new(strip(&scene.candidate_points))
            .with_colors([blue])
            .with_radii([Radius::new_scene_units(0.1)]),
    )?;
    rec.log(
        "scene/candidate/corridor",
        &LineStrips2D::new(scene.candidate_corridor.iter().map(|b| strip(b))).with_colors([magenta]),
    )?;
    rec.log(
        "scene/selected",
        &Points2D::new(strip(&scene.selected_points))
            .with_colors([magenta])
            .with_radii([Radius::new_scene_units(0.2)]),
    )?;
    rec.log(
        "scene/ego",
        &LineStrips2D::new([strip(&scene.footprint)]).with_colors([black]),
    )?;
    
    // Force-limit diagram
    rec.log(
        "forces/friction_circle",
        &LineStrips2D::new([closed_strip(&scene.forces.friction_circle)]).with_colors([black]),
    )?;
    rec.log(
        "forces/candidate",
        &Points2D::new(strip(&scene.forces.candidate)).with_colors([red]),
    )?;
    rec.log(
        "forces/selected",
        &Points2D::new(strip(&scene.forces.selected)).with_colors([blue]),
    )?;
    
    Ok(())
}
