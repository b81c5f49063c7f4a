//! Outbound host signals: the simulated-time channel and the shutdown notice.

use crate::error::EnvError;
use crate::types::{ShutdownNotice, SimTime};
use tokio::sync::watch;

/// Abstraction for the coordinator's outbound boundary.
///
/// # Signal Flow
///
/// ```text
/// RunController                 Host                     Consumers
///   |                            |                           |
///   |-- publish_clock(t) ------->|-- latest timestamp ------>|  (every tick)
///   |-- signal_shutdown(n) ----->|-- termination notice ---->|  (exactly once)
/// ```
///
/// Both calls are non-blocking: a host with no listeners must still accept
/// them, since the loop can never wait on a consumer.
pub trait HostTransport: Send + Sync + 'static {
    /// Publishes the new simulated time on the shared time channel.
    fn publish_clock(&self, now: SimTime) -> Result<(), EnvError>;
    
    /// Emits the termination notice.
    ///
    /// # Returns
    /// * `Ok(())` - Notice delivered (first call)
    /// * `Err(EnvError::AlreadyShutdown)` - A notice was already emitted
    fn signal_shutdown(&self, notice: ShutdownNotice) -> Result<(), EnvError>;
}

/// Receiving ends handed to external consumers of a [`WatchHost`].
#[derive(Debug, Clone)]
pub struct HostReceivers {
    /// Latest simulated time
    pub clock: watch::Receiver<SimTime>,
    
    /// `Some` once the run has ended
    pub shutdown: watch::Receiver<Option<ShutdownNotice>>,
}

/// In-process host backed by tokio `watch` channels.
///
/// Watch semantics match a clock topic: late subscribers see the most recent
/// timestamp, and nobody queues stale ticks.
pub struct WatchHost {
    clock_tx: watch::Sender<SimTime>,
    shutdown_tx: watch::Sender<Option<ShutdownNotice>>,
}

impl WatchHost {
    /// Creates a host whose clock starts at zero.
    pub fn new() -> Self {
        let (clock_tx, _) = watch::channel(SimTime::ZERO);
        let (shutdown_tx, _) = watch::channel(None);
        Self {
            clock_tx,
            shutdown_tx,
        }
    }
    
    /// Subscribes a new consumer.
    pub fn subscribe(&self) -> HostReceivers {
        HostReceivers {
            clock: self.clock_tx.subscribe(),
            shutdown: self.shutdown_tx.subscribe(),
        }
    }
}

impl Default for WatchHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTransport for WatchHost {
    fn publish_clock(&self, now: SimTime) -> Result<(), EnvError> {
        if self.shutdown_tx.borrow().is_some() {
            return Err(EnvError::clock_closed("run already terminated"));
        }
        self.clock_tx.send_replace(now);
        Ok(())
    }
    
    fn signal_shutdown(&self, notice: ShutdownNotice) -> Result<(), EnvError> {
        let mut earlier = None;
        let sent = self.shutdown_tx.send_if_modified(|slot| match slot {
            Some(existing) => {
                earlier = Some(existing.reason.clone());
                false
            }
            None => {
                *slot = Some(notice);
                true
            }
        });
        
        if sent {
            Ok(())
        } else {
            Err(EnvError::already_shutdown(earlier.unwrap_or_default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_clock_visible_to_subscribers() {
        let host = WatchHost::new();
        let rx = host.subscribe();
        
        host.publish_clock(SimTime::from_nanos(10_000_000)).unwrap();
        host.publish_clock(SimTime::from_nanos(20_000_000)).unwrap();
        
        assert_eq!(*rx.clock.borrow(), SimTime::from_nanos(20_000_000));
    }
    
    #[test]
    fn test_publish_without_listeners() {
        let host = WatchHost::new();
        assert!(host.publish_clock(SimTime::from_nanos(1)).is_ok());
    }
    
    #[test]
    fn test_shutdown_only_once() {
        let host = WatchHost::new();
        let rx = host.subscribe();
        
        host.signal_shutdown(ShutdownNotice::new("done", SimTime::ZERO)).unwrap();
        let second = host.signal_shutdown(ShutdownNotice::new("again", SimTime::ZERO));
        
        assert!(matches!(second, Err(EnvError::AlreadyShutdown(reason)) if reason == "done"));
        assert_eq!(rx.shutdown.borrow().as_ref().map(|n| n.reason.as_str()), Some("done"));
    }
    
    #[test]
    fn test_clock_rejected_after_shutdown() {
        let host = WatchHost::new();
        host.signal_shutdown(ShutdownNotice::new("done", SimTime::ZERO)).unwrap();
        assert!(host.publish_clock(SimTime::from_nanos(5)).is_err());
    }
}
