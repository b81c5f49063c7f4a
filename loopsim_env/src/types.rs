//! Common types for the loopsim environment abstraction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A point on the simulated timeline.
///
/// This is a timestamp (seconds + nanoseconds since the start of the run),
/// not a duration: downstream consumers synchronize against it the same way
/// they would against a clock message. Stored as integer nanoseconds so that
/// repeated fixed-step advances never drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    nanos: u64,
}

impl SimTime {
    /// The start of the simulated timeline.
    pub const ZERO: SimTime = SimTime { nanos: 0 };
    
    /// Creates a timestamp from integer nanoseconds.
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }
    
    /// Returns the timestamp in integer nanoseconds.
    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }
    
    /// Returns the timestamp in floating-point seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.as_duration().as_secs_f64()
    }
    
    /// Whole seconds component (clock-message `secs` field).
    pub const fn secs(&self) -> u64 {
        self.nanos / 1_000_000_000
    }
    
    /// Sub-second component in nanoseconds (clock-message `nsecs` field).
    pub const fn subsec_nanos(&self) -> u32 {
        (self.nanos % 1_000_000_000) as u32
    }
    
    /// Time elapsed since the start of the timeline.
    pub const fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.nanos)
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}", self.secs(), self.subsec_nanos())
    }
}

/// The one-shot termination notice sent to the host at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownNotice {
    /// Human-readable reason for the shutdown
    pub reason: String,
    
    /// Simulated time at which the run ended
    pub at: SimTime,
}

impl ShutdownNotice {
    /// Creates a new notice.
    pub fn new(reason: impl Into<String>, at: SimTime) -> Self {
        Self {
            reason: reason.into(),
            at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_sim_time_components() {
        let t = SimTime::from_nanos(2_500_000_000);
        assert_eq!(t.secs(), 2);
        assert_eq!(t.subsec_nanos(), 500_000_000);
        assert_eq!(t.to_string(), "2.500000000");
    }
    
    #[test]
    fn test_sim_time_as_secs() {
        assert_eq!(SimTime::from_nanos(50_000_000).as_secs_f64(), 0.05);
        assert_eq!(SimTime::ZERO.as_duration(), Duration::ZERO);
    }
}
