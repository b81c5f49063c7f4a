//! External stop request, polled once per tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag.
///
/// Set from anywhere (signal handler, test, embedding application); the run
/// controller reads it only at the top of each iteration, so a request never
/// interrupts a tick half-way.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    requested: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Request a graceful stop.
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::Release);
    }
    
    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
