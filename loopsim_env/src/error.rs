//! Error types for the loopsim environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The simulated-time channel has no way to deliver (sender dropped)
    #[error("Clock channel closed: {0}")]
    ClockClosed(String),
    
    /// The shutdown notice was already sent once
    #[error("Shutdown already signalled: {0}")]
    AlreadyShutdown(String),
}

impl EnvError {
    /// Creates a clock-closed error.
    pub fn clock_closed(msg: impl Into<String>) -> Self {
        Self::ClockClosed(msg.into())
    }
    
    /// Creates an already-shutdown error carrying the earlier reason.
    pub fn already_shutdown(reason: impl std::fmt::Display) -> Self {
        Self::AlreadyShutdown(reason.to_string())
    }
}
