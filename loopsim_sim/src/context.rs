//! Virtual-time context implementing LoopContext for tests and batch runs.

use async_trait::async_trait;
use loopsim_env::LoopContext;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Context whose wall clock only moves when the loop sleeps.
///
/// This implements `LoopContext` using:
/// - A virtual clock that can be advanced manually
/// - Simulated sleep that advances virtual time instead of blocking
///
/// A run paced by this context finishes as fast as the CPU allows while
/// still recording exactly how much wall time real pacing would have cost.
pub struct VirtualContext {
    /// Current virtual wall time (nanoseconds since creation)
    virtual_time_ns: Arc<Mutex<u64>>,
    
    /// Number of completed `sleep` calls
    sleeps: Arc<Mutex<u64>>,
}

impl VirtualContext {
    /// Creates a new VirtualContext at time zero.
    pub fn new() -> Self {
        Self {
            virtual_time_ns: Arc::new(Mutex::new(0)),
            sleeps: Arc::new(Mutex::new(0)),
        }
    }
    
    /// Creates an Arc-wrapped context for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
    
    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let step = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        let mut time = self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *time = time.saturating_add(step);
    }
    
    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner)
    }
    
    /// Returns how many times the loop has suspended.
    pub fn sleep_count(&self) -> u64 {
        *self.sleeps.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for VirtualContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VirtualContext {
    fn clone(&self) -> Self {
        Self {
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            sleeps: Arc::clone(&self.sleeps),
        }
    }
}

#[async_trait]
impl LoopContext for VirtualContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }
    
    async fn sleep(&self, duration: Duration) {
        self.advance_time(duration);
        *self.sleeps.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        // Give producer tasks a chance to run, as a real sleep would
        tokio::task::yield_now().await;
    }
    
    fn spawn<F>(&self, _name: &str, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(future);
    }
}
