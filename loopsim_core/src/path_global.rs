//! The global reference path: the full route for the whole run.
//!
//! Stored as a mapping of named numeric sequences (`s`, `X`, `Y`, `psi_c`,
//! `kappa_c`, ...). The coordinator never interprets it; it is loaded once
//! before the loop starts and bundled verbatim into the log artifact.

use crate::error::PathLoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Named numeric sequences describing the route. Read-only after load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalPath {
    sequences: BTreeMap<String, Vec<f64>>,
}

impl GlobalPath {
    /// Builds a path from already-loaded sequences.
    pub fn from_sequences<I, K>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<f64>)>,
        K: Into<String>,
    {
        Self {
            sequences: sequences.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
    
    /// Loads the artifact from a JSON file.
    ///
    /// # Errors
    ///
    /// [`PathLoadError`] if the file is unreadable, malformed, or holds no
    /// sequences at all.
    pub fn load(path: &Path) -> Result<Self, PathLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PathLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let global: Self = serde_json::from_str(&contents).map_err(|source| PathLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        
        if global.sequences.is_empty() {
            return Err(PathLoadError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(global)
    }
    
    /// Returns one named sequence.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.sequences.get(name).map(Vec::as_slice)
    }
    
    /// Sequence names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }
    
    /// Number of named sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
