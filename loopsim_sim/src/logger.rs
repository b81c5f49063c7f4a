//! Time-series logger and the durable log artifact.
//!
//! The log is append-only: one record per tick, in tick order, never
//! reordered or edited. At the end of the run it is bundled with the global
//! path into a single JSON artifact.

use loopsim_core::{GlobalPath, Provenance, Snapshot, VehicleState};
use loopsim_env::SimTime;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Failure to write the log artifact.
///
/// The in-memory log is untouched by any of these.
#[derive(Debug, Error)]
pub enum LogWriteError {
    #[error("failed to serialize log: {0}")]
    Serialize(#[from] serde_json::Error),
    
    #[error("failed to write log to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One vehicle-state record, flattened to scalar fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    pub psi: f64,
    pub s: f64,
    pub d: f64,
    #[serde(rename = "deltapsi")]
    pub delta_psi: f64,
    #[serde(rename = "psidot")]
    pub psi_dot: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,
    #[serde(rename = "stop")]
    pub stop_flag: bool,
}

impl From<&VehicleState> for StateRecord {
    fn from(state: &VehicleState) -> Self {
        Self {
            x: state.x,
            y: state.y,
            psi: state.psi,
            s: state.s,
            d: state.d,
            delta_psi: state.delta_psi,
            psi_dot: state.psi_dot,
            vx: state.vx,
            vy: state.vy,
            ax: state.ax,
            ay: state.ay,
            stop_flag: state.stop_flag,
        }
    }
}

/// A record captured from a snapshot but not yet stamped with its tick time.
#[derive(Debug, Clone, Copy)]
pub struct PendingRecord {
    state: StateRecord,
    provenance: Provenance,
}

impl PendingRecord {
    /// Captures the vehicle state (and contributing update counts) of a snapshot.
    pub fn capture(snapshot: &Snapshot) -> Self {
        Self {
            state: StateRecord::from(snapshot.state.as_ref()),
            provenance: snapshot.provenance,
        }
    }
}

/// The in-memory, append-only time series.
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesLog {
    sampled_times: Vec<f64>,
    state_records: Vec<StateRecord>,
    provenance: Vec<Provenance>,
}

impl TimeSeriesLog {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Appends one tick.
    pub fn push(&mut self, time: SimTime, record: PendingRecord) {
        self.sampled_times.push(time.as_secs_f64());
        self.state_records.push(record.state);
        self.provenance.push(record.provenance);
    }
    
    /// Number of ticks recorded.
    pub fn len(&self) -> usize {
        self.state_records.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.state_records.is_empty()
    }
    
    pub fn sampled_times(&self) -> &[f64] {
        &self.sampled_times
    }
    
    pub fn state_records(&self) -> &[StateRecord] {
        &self.state_records
    }
    
    pub fn provenance(&self) -> &[Provenance] {
        &self.provenance
    }
    
    /// Builds the artifact view over this log.
    pub fn artifact<'a>(&'a self, global_path: &'a GlobalPath, dt: Duration) -> LogArtifact<'a> {
        LogArtifact {
            dt: dt.as_secs_f64(),
            sampled_times: &self.sampled_times,
            global_path,
            state_records: &self.state_records,
            provenance: &self.provenance,
        }
    }
    
    /// Writes the artifact to `path`, all or nothing.
    ///
    /// The JSON is written to a temporary file next to `path` and renamed
    /// into place, so a failure never leaves a truncated artifact behind.
    pub fn write_to_file(&self, path: &Path, global_path: &GlobalPath, dt: Duration) -> Result<(), LogWriteError> {
        let json = serde_json::to_vec_pretty(&self.artifact(global_path, dt))?;
        
        let io_err = |source: std::io::Error| LogWriteError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

/// The durable log bundle.
#[derive(Debug, Serialize)]
pub struct LogArtifact<'a> {
    /// Simulation step (s)
    pub dt: f64,
    
    /// Time of each record (s)
    #[serde(rename = "tvec")]
    pub sampled_times: &'a [f64],
    
    #[serde(rename = "pathglobal")]
    pub global_path: &'a GlobalPath,
    
    #[serde(rename = "states")]
    pub state_records: &'a [StateRecord],
    
    /// Per-record channel update counts
    pub provenance: &'a [Provenance],
}

/// Owned form of [`LogArtifact`], for reading an artifact back.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadedArtifact {
    pub dt: f64,
    #[serde(rename = "tvec")]
    pub sampled_times: Vec<f64>,
    #[serde(rename = "pathglobal")]
    pub global_path: GlobalPath,
    #[serde(rename = "states")]
    pub state_records: Vec<StateRecord>,
    #[serde(default)]
    pub provenance: Vec<Provenance>,
}

impl LoadedArtifact {
    /// Reads an artifact written by [`TimeSeriesLog::write_to_file`].
    pub fn read(path: &Path) -> Result<Self, LogWriteError> {
        let bytes = std::fs::read(path).map_err(|source| LogWriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
