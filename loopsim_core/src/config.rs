//! Experiment configuration.
//!
//! Values arrive from two places: a JSON parameter file (the shared
//! parameter store every node of the experiment reads) and command-line
//! overrides. Both deserialize into [`ExperimentParams`], where every field is
//! optional; [`ExperimentParams::resolve`] then checks that the required ones
//! are present and produces an [`ExperimentConfig`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed simulation step used when none is configured (s).
pub const DEFAULT_DT: f64 = 0.01;

/// Real-time pacing.
pub const DEFAULT_SLOWDOWN_FACTOR: f64 = 1.0;

/// Raw, possibly incomplete, parameter set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParams {
    /// Simulation horizon (s)
    pub t_final: Option<f64>,
    
    /// Simulation step (s)
    pub dt: Option<f64>,
    
    /// Enable the live visualizer
    pub do_liveplot: Option<bool>,
    
    /// Write the time-series log at the end of the run
    pub save_logfile: Option<bool>,
    
    /// Destination of the log artifact
    pub log_filepath: Option<PathBuf>,
    
    /// Location of the global path artifact
    pub pathglobal_filepath: Option<PathBuf>,
    
    /// Wall-time multiplier applied to the pacing sleep
    pub slowdown_factor: Option<f64>,
}

impl ExperimentParams {
    /// Reads a parameter file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
    
    /// Layers `overrides` on top of `self`; any value set in `overrides` wins.
    pub fn merge(self, overrides: ExperimentParams) -> Self {
        Self {
            t_final: overrides.t_final.or(self.t_final),
            dt: overrides.dt.or(self.dt),
            do_liveplot: overrides.do_liveplot.or(self.do_liveplot),
            save_logfile: overrides.save_logfile.or(self.save_logfile),
            log_filepath: overrides.log_filepath.or(self.log_filepath),
            pathglobal_filepath: overrides.pathglobal_filepath.or(self.pathglobal_filepath),
            slowdown_factor: overrides.slowdown_factor.or(self.slowdown_factor),
        }
    }
    
    /// Validates the parameter set.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] for an absent required value (`t_final`,
    /// `do_liveplot`, `save_logfile`, `pathglobal_filepath`, and
    /// `log_filepath` when logging is enabled); [`ConfigError::Invalid`] for
    /// out-of-range numbers.
    pub fn resolve(&self) -> Result<ExperimentConfig, ConfigError> {
        let t_final = self.t_final.ok_or(ConfigError::Missing { key: "t_final" })?;
        let live_plot = self.do_liveplot.ok_or(ConfigError::Missing { key: "do_liveplot" })?;
        let save_logfile = self.save_logfile.ok_or(ConfigError::Missing { key: "save_logfile" })?;
        let path_global = self
            .pathglobal_filepath
            .clone()
            .ok_or(ConfigError::Missing { key: "pathglobal_filepath" })?;
        
        let log_filepath = if save_logfile {
            Some(
                self.log_filepath
                    .clone()
                    .ok_or(ConfigError::Missing { key: "log_filepath" })?,
            )
        } else {
            None
        };
        
        let horizon = Duration::try_from_secs_f64(t_final)
            .map_err(|e| ConfigError::invalid("t_final", e.to_string()))?;
        
        let dt = self.dt.unwrap_or(DEFAULT_DT);
        let dt = Duration::try_from_secs_f64(dt)
            .map_err(|e| ConfigError::invalid("dt", e.to_string()))?;
        if dt.is_zero() {
            return Err(ConfigError::invalid("dt", "step must be positive"));
        }
        
        let slowdown_factor = self.slowdown_factor.unwrap_or(DEFAULT_SLOWDOWN_FACTOR);
        if !slowdown_factor.is_finite() || slowdown_factor < 0.0 {
            return Err(ConfigError::invalid(
                "slowdown_factor",
                format!("expected a finite value >= 0, got {slowdown_factor}"),
            ));
        }
        
        Ok(ExperimentConfig {
            horizon,
            dt,
            live_plot,
            log_filepath,
            path_global,
            slowdown_factor,
        })
    }
}

/// Validated configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Simulated time at which the run ends
    pub horizon: Duration,
    
    /// Fixed simulation step
    pub dt: Duration,
    
    /// Whether the live visualizer runs
    pub live_plot: bool,
    
    /// Where to write the log; `None` disables logging
    pub log_filepath: Option<PathBuf>,
    
    /// Global path artifact
    pub path_global: PathBuf,
    
    /// Pacing multiplier (1 = real time, 0 = as fast as possible)
    pub slowdown_factor: f64,
}

impl ExperimentConfig {
    /// Whether the time-series log is collected and written.
    pub fn save_logfile(&self) -> bool {
        self.log_filepath.is_some()
    }
}
