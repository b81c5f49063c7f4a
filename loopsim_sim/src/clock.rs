//! Clock coordinator - the single owner of simulated time.
//!
//! Time is kept as an integer tick count and derived as `tick × dt` in
//! nanoseconds, so every advance moves the published timestamp by exactly
//! `dt` no matter how long the run is.

use loopsim_env::{EnvError, HostTransport, SimTime};
use std::time::Duration;

/// Fixed-step simulated clock with a horizon.
#[derive(Debug, Clone)]
pub struct ClockCoordinator {
    /// Ticks completed so far
    tick: u64,
    
    /// Step in nanoseconds
    dt_ns: u64,
    
    /// Horizon in nanoseconds
    horizon_ns: u64,
}

impl ClockCoordinator {
    /// Creates a clock at t = 0.
    ///
    /// `dt` must be non-zero; steps or horizons beyond `u64` nanoseconds
    /// saturate.
    pub fn new(dt: Duration, horizon: Duration) -> Self {
        let to_ns = |d: Duration| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
        Self {
            tick: 0,
            dt_ns: to_ns(dt).max(1),
            horizon_ns: to_ns(horizon),
        }
    }
    
    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        SimTime::from_nanos(self.dt_ns.saturating_mul(self.tick))
    }
    
    /// Fixed step.
    pub fn dt(&self) -> Duration {
        Duration::from_nanos(self.dt_ns)
    }
    
    /// Ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }
    
    /// Whether `t ≥ t_final`.
    pub fn horizon_reached(&self) -> bool {
        self.now().as_nanos() >= self.horizon_ns
    }
    
    /// Number of ticks a full run takes: ⌈t_final / dt⌉.
    pub fn max_ticks(&self) -> u64 {
        self.horizon_ns.div_ceil(self.dt_ns)
    }
    
    /// Moves time forward by one step and returns the new time.
    pub fn advance(&mut self) -> SimTime {
        self.tick += 1;
        self.now()
    }
    
    /// Advances and publishes the new timestamp on the host's time channel.
    ///
    /// The clock has advanced even if publishing fails.
    pub fn advance_and_publish<H: HostTransport + ?Sized>(&mut self, host: &H) -> Result<SimTime, (SimTime, EnvError)> {
        let now = self.advance();
        host.publish_clock(now).map(|()| now).map_err(|e| (now, e))
    }
}

/// Wall-time scheduling between ticks.
///
/// The sleep never accounts for time spent inside the tick, so drift
/// accumulates and a slow tick is not caught up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingPolicy {
    /// Sleep a fixed interval after every tick
    Fixed(Duration),
    /// No wall-time pacing; the loop still yields once per tick
    Unpaced,
}

impl PacingPolicy {
    /// `dt × slowdown_factor`; a zero product means unpaced.
    pub fn from_step(dt: Duration, slowdown_factor: f64) -> Self {
        let interval = if slowdown_factor.is_finite() && slowdown_factor > 0.0 {
            Duration::try_from_secs_f64(dt.as_secs_f64() * slowdown_factor).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        if interval.is_zero() {
            PacingPolicy::Unpaced
        } else {
            PacingPolicy::Fixed(interval)
        }
    }
    
    /// Time slept after each tick.
    pub fn interval(&self) -> Duration {
        match self {
            PacingPolicy::Fixed(interval) => *interval,
            PacingPolicy::Unpaced => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopsim_env::WatchHost;
    use proptest::prelude::*;
    
    #[test]
    fn test_clock_starts_at_zero() {
        let clock = ClockCoordinator::new(Duration::from_millis(10), Duration::from_secs(1));
        assert_eq!(clock.now(), SimTime::ZERO);
        assert_eq!(clock.tick_count(), 0);
        assert!(!clock.horizon_reached());
    }
    
    #[test]
    fn test_horizon_tick_count() {
        let dt = Duration::from_millis(10);
        let mut clock = ClockCoordinator::new(dt, Duration::from_secs_f64(0.05));
        assert_eq!(clock.max_ticks(), 5);
        
        let mut ticks = 0;
        while !clock.horizon_reached() {
            clock.advance();
            ticks += 1;
        }
        assert_eq!(ticks, 5);
        assert_eq!(clock.now(), SimTime::from_nanos(50_000_000));
    }
    
    #[test]
    fn test_partial_last_step_rounds_up() {
        let clock = ClockCoordinator::new(Duration::from_millis(30), Duration::from_millis(100));
        assert_eq!(clock.max_ticks(), 4);
    }
    
    #[test]
    fn test_zero_horizon_never_ticks() {
        let clock = ClockCoordinator::new(Duration::from_millis(10), Duration::ZERO);
        assert!(clock.horizon_reached());
        assert_eq!(clock.max_ticks(), 0);
    }
    
    #[test]
    fn test_advance_publishes() {
        let host = WatchHost::new();
        let rx = host.subscribe();
        let mut clock = ClockCoordinator::new(Duration::from_millis(10), Duration::from_secs(1));
        
        let t = clock.advance_and_publish(&host).unwrap();
        assert_eq!(t, SimTime::from_nanos(10_000_000));
        assert_eq!(*rx.clock.borrow(), t);
    }
    
    #[test]
    fn test_pacing_policy() {
        let dt = Duration::from_millis(10);
        assert_eq!(PacingPolicy::from_step(dt, 1.0), PacingPolicy::Fixed(dt));
        assert_eq!(PacingPolicy::from_step(dt, 2.5).interval(), Duration::from_millis(25));
        assert_eq!(PacingPolicy::from_step(dt, 0.0), PacingPolicy::Unpaced);
        assert_eq!(PacingPolicy::from_step(dt, f64::NAN), PacingPolicy::Unpaced);
        assert_eq!(PacingPolicy::Unpaced.interval(), Duration::ZERO);
    }
    
    proptest! {
        #[test]
        fn prop_each_tick_adds_exactly_dt(dt_us in 1u64..1_000_000, steps in 1usize..500) {
            let dt = Duration::from_micros(dt_us);
            let mut clock = ClockCoordinator::new(dt, Duration::from_secs(3600));
            let mut previous = clock.now();
            for _ in 0..steps {
                let next = clock.advance();
                prop_assert_eq!(next.as_nanos() - previous.as_nanos(), dt_us * 1_000);
                previous = next;
            }
        }
    }
}
