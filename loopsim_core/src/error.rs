//! Error types for startup (configuration and reference data).

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving the experiment configuration.
///
/// All of these are fatal: the run never leaves `INITIALIZING`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value was supplied neither in the parameter file nor on
    /// the command line
    #[error("missing configuration value `{key}`")]
    Missing { key: &'static str },
    
    /// A value was supplied but is out of range
    #[error("invalid configuration value `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
    
    /// The parameter file could not be read
    #[error("failed to read parameter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    
    /// The parameter file is not valid JSON of the expected shape
    #[error("failed to parse parameter file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading the global reference path.
#[derive(Debug, Error)]
pub enum PathLoadError {
    #[error("failed to read global path {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    
    #[error("failed to parse global path {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    
    /// The file parsed but describes no route
    #[error("global path {path} contains no sequences")]
    Empty { path: PathBuf },
}
