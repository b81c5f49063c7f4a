//! Core environment context trait for the run loop.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The interface between the run loop and wall-clock time.
///
/// The coordinator only ever suspends in one place per tick (the pacing
/// sleep), and that suspension goes through this trait so that tests can
/// substitute a virtual clock and run a multi-second experiment instantly.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Virtual**: `VirtualContext` (in `loopsim_sim`) - sleep advances a counter
#[async_trait]
pub trait LoopContext: Send + Sync + 'static {
    /// Returns the monotonic wall time elapsed since the context was created.
    ///
    /// Used to measure how long logging and rendering took inside a tick.
    fn now(&self) -> Duration;
    
    /// Suspends the calling task for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In virtual time: advances the context's clock and returns immediately
    async fn sleep(&self, duration: Duration);
    
    /// Spawns a background task.
    ///
    /// Producer ingestion tasks are started through this so they share the
    /// runtime of the loop that reads their output.
    fn spawn<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
