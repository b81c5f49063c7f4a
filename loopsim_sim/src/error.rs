//! Errors that abort a run before it starts.

use loopsim_core::{ConfigError, PathLoadError};
use thiserror::Error;

/// Fatal run-controller errors.
///
/// Per-tick problems (render failures, an unreachable time channel) and the
/// finalize-time log write are not represented here: they are reported in
/// the [`RunReport`](crate::RunReport) instead of aborting the run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    
    #[error("global path error: {0}")]
    PathLoad(#[from] PathLoadError),
    
    /// `run` was called on a controller that already terminated
    #[error("run already terminated")]
    AlreadyTerminated,
}
