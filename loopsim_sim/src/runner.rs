//! Run controller - drives the fixed-step loop from start to shutdown.
//!
//! ```text
//! INITIALIZING ──► RUNNING ──► FINALIZING ──► TERMINATED
//!                   │   ▲
//!                   └───┘  log → advance + publish → render → pace → check
//! ```
//!
//! The loop reads the snapshot store and never waits on a producer. Its only
//! suspension point is the pacing sleep at the end of each tick, and the
//! stop flag is only consulted at the top of an iteration.

use crate::clock::{ClockCoordinator, PacingPolicy};
use crate::error::RunError;
use crate::ingest::{self, ProducerPorts};
use crate::logger::{PendingRecord, TimeSeriesLog};
use crate::stop::StopSignal;
use crate::visualizer::{FrameRenderer, LiveVisualizer};

use loopsim_core::{ExperimentConfig, ExperimentParams, GlobalPath, Scene, SnapshotStore};
use loopsim_env::{HostTransport, LoopContext, ShutdownNotice, SimTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Initializing,
    Running,
    Finalizing,
    Terminated,
}

/// Why the loop stopped ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `t ≥ t_final`
    HorizonReached,
    /// External stop request (e.g. Ctrl-C)
    StopRequested,
}

impl ExitReason {
    /// Reason string carried by the shutdown notice.
    pub fn shutdown_message(&self) -> &'static str {
        match self {
            ExitReason::HorizonReached => "run finished, shutting down",
            ExitReason::StopRequested => "stop requested, shutting down",
        }
    }
}

/// What happened to the time-series log at finalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    /// Logging was not enabled for this run
    Disabled,
    /// Artifact written
    Written { path: PathBuf, records: usize },
    /// Artifact could not be written
    Failed { path: PathBuf, error: String },
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Ticks executed
    pub ticks: u64,
    
    /// Simulated time at the end of the run
    pub final_time: SimTime,
    
    pub exit_reason: ExitReason,
    
    /// Frames drawn by the live visualizer
    pub frames_rendered: u64,
    
    /// Frames dropped because drawing failed
    pub frames_skipped: u64,
    
    pub log: LogOutcome,
    
    /// Reason string sent with the shutdown notice
    pub shutdown_reason: String,
    
    /// Whether the host accepted the shutdown notice
    pub shutdown_delivered: bool,
}

impl RunReport {
    /// False when finalize hit a fatal log write failure.
    pub fn is_success(&self) -> bool {
        !matches!(self.log, LogOutcome::Failed { .. })
    }
}

/// Reads the parameter file (if any), layers `overrides` on top and
/// validates the result.
///
/// # Errors
///
/// [`RunError::Config`] if the file cannot be read or a required value is
/// missing or out of range.
pub fn load_config(params_file: Option<&Path>, overrides: ExperimentParams) -> Result<ExperimentConfig, RunError> {
    let base = match params_file {
        Some(path) => ExperimentParams::from_file(path)?,
        None => ExperimentParams::default(),
    };
    Ok(base.merge(overrides).resolve()?)
}

/// Per-run counters.
#[derive(Debug, Default)]
struct TickStats {
    frames_rendered: u64,
    frames_skipped: u64,
    clock_publish_failed: bool,
}

/// Owns the clock, the snapshot store and the consumers for one run.
///
/// Generic over the context (wall-clock pacing) and the host (outbound time
/// channel and shutdown notice), so the same loop runs in real time or in
/// virtual time.
pub struct RunController<Ctx, Host>
where
    Ctx: LoopContext,
    Host: HostTransport,
{
    /// Environment context
    context: Arc<Ctx>,
    
    /// Outbound signals
    host: Arc<Host>,
    
    config: ExperimentConfig,
    
    /// Shared with producers; the controller only reads it
    store: Arc<SnapshotStore>,
    
    /// Read-only reference data bundled into the log
    global_path: GlobalPath,
    
    clock: ClockCoordinator,
    
    /// Present only when logging is enabled
    log: Option<TimeSeriesLog>,
    
    /// Present only when live visualization is enabled and available
    renderer: Option<Box<dyn FrameRenderer>>,
    
    stop: StopSignal,
    
    state: RunState,
}

impl<Ctx, Host> RunController<Ctx, Host>
where
    Ctx: LoopContext,
    Host: HostTransport,
{
    /// INITIALIZING: loads the global path, builds the store with defaults
    /// and, if configured, the live visualizer.
    ///
    /// # Errors
    ///
    /// [`RunError::PathLoad`] if the global path cannot be loaded.
    pub fn initialize(config: ExperimentConfig, context: Arc<Ctx>, host: Arc<Host>) -> Result<Self, RunError> {
        let global_path = GlobalPath::load(&config.path_global)?;
        info!(
            "Loaded global path from {} ({} sequences)",
            config.path_global.display(),
            global_path.len()
        );
        
        let live_plot = config.live_plot;
        let mut controller = Self::with_global_path(config, global_path, context, host);
        
        if live_plot {
            let visualizer = LiveVisualizer::new("loopsim");
            if visualizer.is_enabled() {
                controller.renderer = Some(Box::new(visualizer));
            }
        }
        
        Ok(controller)
    }
    
    /// Builds a controller around an already-loaded global path. No
    /// renderer is attached.
    pub fn with_global_path(
        config: ExperimentConfig,
        global_path: GlobalPath,
        context: Arc<Ctx>,
        host: Arc<Host>,
    ) -> Self {
        let clock = ClockCoordinator::new(config.dt, config.horizon);
        let log = config.save_logfile().then(TimeSeriesLog::new);
        
        Self {
            context,
            host,
            config,
            store: SnapshotStore::shared(),
            global_path,
            clock,
            log,
            renderer: None,
            stop: StopSignal::new(),
            state: RunState::Initializing,
        }
    }
    
    /// Attaches a frame renderer (used when live visualization is enabled).
    pub fn with_renderer(mut self, renderer: Box<dyn FrameRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }
    
    /// Uses an externally owned stop flag.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }
    
    /// Subscribes all producer channels to this run's store.
    pub fn subscribe_producers(&self) -> ProducerPorts {
        ingest::subscribe_all(self.context.as_ref(), &self.store)
    }
    
    /// The snapshot store producers write into.
    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }
    
    /// Handle for requesting a graceful stop.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }
    
    pub fn state(&self) -> RunState {
        self.state
    }
    
    pub fn clock(&self) -> &ClockCoordinator {
        &self.clock
    }
    
    /// The in-memory log, if logging is enabled.
    pub fn log(&self) -> Option<&TimeSeriesLog> {
        self.log.as_ref()
    }
    
    /// RUNNING → FINALIZING → TERMINATED.
    ///
    /// Ticks until the horizon is reached or a stop is requested, then
    /// writes the log (if enabled) and emits the shutdown notice. A log
    /// write failure is reported in the returned [`RunReport`]; the notice
    /// is sent regardless.
    pub async fn run(&mut self) -> Result<RunReport, RunError> {
        if self.state == RunState::Terminated {
            return Err(RunError::AlreadyTerminated);
        }
        
        self.state = RunState::Running;
        let pacing = PacingPolicy::from_step(self.clock.dt(), self.config.slowdown_factor);
        let mut stats = TickStats::default();
        
        info!(
            "Starting run: dt={:?}, horizon={:?} ({} ticks), pacing {:?}",
            self.clock.dt(),
            self.config.horizon,
            self.clock.max_ticks(),
            pacing
        );
        
        let exit_reason = loop {
            if self.stop.is_stop_requested() {
                break ExitReason::StopRequested;
            }
            if self.clock.horizon_reached() {
                break ExitReason::HorizonReached;
            }
            
            self.tick(&mut stats);
            
            self.context.sleep(pacing.interval()).await;
        };
        
        Ok(self.finalize(exit_reason, stats))
    }
    
    fn tick(&mut self, stats: &mut TickStats) {
        let pending = self
            .log
            .as_ref()
            .map(|_| PendingRecord::capture(&self.store.snapshot()));
        
        let now = match self.clock.advance_and_publish(self.host.as_ref()) {
            Ok(now) => now,
            Err((now, e)) => {
                if !stats.clock_publish_failed {
                    warn!("Failed to publish simulated time: {}", e);
                    stats.clock_publish_failed = true;
                }
                now
            }
        };
        
        if let (Some(log), Some(record)) = (self.log.as_mut(), pending) {
            log.push(now, record);
        }
        
        info!("simtime t = {:.3}", now.as_secs_f64());
        
        if self.config.live_plot {
            self.render(now, stats);
        }
    }
    
    fn render(&mut self, now: SimTime, stats: &mut TickStats) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        
        let started = self.context.now();
        let scene = Scene::compose(&self.store.snapshot());
        
        match renderer.render(now, &scene) {
            Ok(()) => stats.frames_rendered += 1,
            Err(e) => {
                warn!("Skipping frame at t={}: {}", now, e);
                stats.frames_skipped += 1;
            }
        }
        
        let elapsed = self.context.now().saturating_sub(started);
        debug!("frame drawn in {:?}", elapsed);
        if elapsed > self.clock.dt() {
            warn!("render time {:?} exceeds dt {:?}", elapsed, self.clock.dt());
        }
    }
    
    fn finalize(&mut self, exit_reason: ExitReason, stats: TickStats) -> RunReport {
        self.state = RunState::Finalizing;
        let final_time = self.clock.now();
        info!("simulation finished after {} ticks (t = {})", self.clock.tick_count(), final_time);
        
        let log = match (&self.log, &self.config.log_filepath) {
            (Some(log), Some(path)) => {
                info!("saving logfile to {}", path.display());
                match log.write_to_file(path, &self.global_path, self.clock.dt()) {
                    Ok(()) => LogOutcome::Written {
                        path: path.clone(),
                        records: log.len(),
                    },
                    Err(e) => {
                        error!("Failed to write log: {}", e);
                        LogOutcome::Failed {
                            path: path.clone(),
                            error: e.to_string(),
                        }
                    }
                }
            }
            _ => LogOutcome::Disabled,
        };
        
        let reason = exit_reason.shutdown_message();
        info!("{}", reason);
        let shutdown_delivered = match self.host.signal_shutdown(ShutdownNotice::new(reason, final_time)) {
            Ok(()) => true,
            Err(e) => {
                warn!("Shutdown notice not delivered: {}", e);
                false
            }
        };
        
        self.state = RunState::Terminated;
        
        RunReport {
            ticks: self.clock.tick_count(),
            final_time,
            exit_reason,
            frames_rendered: stats.frames_rendered,
            frames_skipped: stats.frames_skipped,
            log,
            shutdown_reason: reason.to_string(),
            shutdown_delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::VirtualContext;
    use crate::logger::{LoadedArtifact, StateRecord};
    use crate::visualizer::RenderError;
    use loopsim_core::{StaticVehicleParams, VehicleState};
    use loopsim_env::{EnvError, WatchHost};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;
    
    /// WatchHost that also counts calls.
    #[derive(Default)]
    struct CountingHost {
        inner: WatchHost,
        clock_calls: AtomicU64,
        shutdown_calls: AtomicU64,
    }
    
    impl HostTransport for CountingHost {
        fn publish_clock(&self, now: SimTime) -> Result<(), EnvError> {
            self.clock_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.publish_clock(now)
        }
        
        fn signal_shutdown(&self, notice: ShutdownNotice) -> Result<(), EnvError> {
            self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.signal_shutdown(notice)
        }
    }
    
    /// Counts frames and fails every other one.
    struct FlakyRenderer {
        frames: Arc<AtomicU64>,
    }
    
    impl FrameRenderer for FlakyRenderer {
        fn render(&mut self, _time: SimTime, _scene: &Scene) -> Result<(), RenderError> {
            let n = self.frames.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 1 {
                return Err(RenderError::Backend("surface lost".into()));
            }
            Ok(())
        }
    }
    
    /// Requests a stop from inside the loop after a number of frames.
    struct StopAfter {
        remaining: u32,
        stop: StopSignal,
    }
    
    impl FrameRenderer for StopAfter {
        fn render(&mut self, _time: SimTime, _scene: &Scene) -> Result<(), RenderError> {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.stop.request_stop();
            }
            Ok(())
        }
    }
    
    fn test_config(horizon_ms: u64, log_filepath: Option<PathBuf>) -> ExperimentConfig {
        ExperimentConfig {
            horizon: Duration::from_millis(horizon_ms),
            dt: Duration::from_millis(10),
            live_plot: false,
            log_filepath,
            path_global: PathBuf::from("unused.json"),
            slowdown_factor: 1.0,
        }
    }
    
    fn global_path() -> GlobalPath {
        GlobalPath::from_sequences([("s", vec![0.0, 1.0, 2.0]), ("X", vec![0.0, 1.0, 2.0])])
    }
    
    fn controller(
        config: ExperimentConfig,
        host: Arc<CountingHost>,
    ) -> (RunController<VirtualContext, CountingHost>, Arc<VirtualContext>) {
        let ctx = VirtualContext::shared();
        let controller = RunController::with_global_path(config, global_path(), Arc::clone(&ctx), host);
        (controller, ctx)
    }
    
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }
    
    #[tokio::test]
    async fn test_run_to_horizon_writes_log_and_shuts_down_once() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.json");
        let host = Arc::new(CountingHost::default());
        let mut receivers = host.inner.subscribe();
        
        let (mut controller, _ctx) = controller(test_config(50, Some(log_path.clone())), Arc::clone(&host));
        assert_eq!(controller.state(), RunState::Initializing);
        
        let report = controller.run().await.unwrap();
        
        assert_eq!(report.ticks, 5);
        assert_eq!(report.exit_reason, ExitReason::HorizonReached);
        assert_eq!(report.final_time, SimTime::from_nanos(50_000_000));
        assert!(report.is_success());
        assert!(report.shutdown_delivered);
        assert_eq!(controller.state(), RunState::Terminated);
        
        let log = controller.log().unwrap();
        assert_eq!(log.sampled_times(), &[0.01, 0.02, 0.03, 0.04, 0.05]);
        
        assert_eq!(host.clock_calls.load(Ordering::SeqCst), 5);
        assert_eq!(host.shutdown_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*receivers.clock.borrow_and_update(), SimTime::from_nanos(50_000_000));
        let notice = receivers.shutdown.borrow().clone().unwrap();
        assert_eq!(notice.reason, "run finished, shutting down");
        
        assert_eq!(
            report.log,
            LogOutcome::Written {
                path: log_path.clone(),
                records: 5
            }
        );
        let artifact = LoadedArtifact::read(&log_path).unwrap();
        assert_eq!(artifact.dt, 0.01);
        assert_eq!(artifact.sampled_times.len(), 5);
        assert_eq!(artifact.state_records.len(), 5);
        assert_eq!(artifact.global_path.get("s"), Some(&[0.0, 1.0, 2.0][..]));
    }
    
    #[tokio::test]
    async fn test_no_log_without_logfile() {
        let host = Arc::new(CountingHost::default());
        let (mut controller, _ctx) = controller(test_config(30, None), Arc::clone(&host));
        
        let report = controller.run().await.unwrap();
        
        assert_eq!(report.ticks, 3);
        assert!(controller.log().is_none());
        assert_eq!(report.log, LogOutcome::Disabled);
        assert_eq!(host.shutdown_calls.load(Ordering::SeqCst), 1);
    }
    
    #[tokio::test]
    async fn test_stop_before_first_tick() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.json");
        let host = Arc::new(CountingHost::default());
        let (mut controller, _ctx) = controller(test_config(1_000, Some(log_path.clone())), Arc::clone(&host));
        
        controller.stop_signal().request_stop();
        let report = controller.run().await.unwrap();
        
        assert_eq!(report.ticks, 0);
        assert_eq!(report.exit_reason, ExitReason::StopRequested);
        assert_eq!(report.shutdown_reason, "stop requested, shutting down");
        assert_eq!(host.clock_calls.load(Ordering::SeqCst), 0);
        assert_eq!(host.shutdown_calls.load(Ordering::SeqCst), 1);
        
        // An empty log is still written
        let artifact = LoadedArtifact::read(&log_path).unwrap();
        assert!(artifact.sampled_times.is_empty());
    }
    
    #[tokio::test]
    async fn test_stop_is_observed_at_next_tick_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("run.json");
        let host = Arc::new(CountingHost::default());
        let mut config = test_config(1_000, Some(log_path));
        config.live_plot = true;
        
        let (controller, _ctx) = controller(config, host);
        let stop = controller.stop_signal();
        let mut controller = controller.with_renderer(Box::new(StopAfter { remaining: 3, stop }));
        
        let report = controller.run().await.unwrap();
        
        // The third tick completes, including its log record
        assert_eq!(report.ticks, 3);
        assert_eq!(report.exit_reason, ExitReason::StopRequested);
        assert_eq!(controller.log().unwrap().len(), 3);
        assert_eq!(report.log, LogOutcome::Written { path: dir.path().join("run.json"), records: 3 });
    }
    
    #[tokio::test]
    async fn test_render_failure_skips_frame() {
        let host = Arc::new(CountingHost::default());
        let mut config = test_config(60, None);
        config.live_plot = true;
        
        let frames = Arc::new(AtomicU64::new(0));
        let (controller, _ctx) = controller(config, host);
        let mut controller = controller.with_renderer(Box::new(FlakyRenderer {
            frames: Arc::clone(&frames),
        }));
        
        let report = controller.run().await.unwrap();
        
        assert_eq!(report.ticks, 6);
        assert_eq!(frames.load(Ordering::SeqCst), 6);
        assert_eq!(report.frames_rendered, 3);
        assert_eq!(report.frames_skipped, 3);
        assert_eq!(report.exit_reason, ExitReason::HorizonReached);
    }
    
    #[tokio::test]
    async fn test_renderer_unused_when_live_plot_disabled() {
        let host = Arc::new(CountingHost::default());
        let frames = Arc::new(AtomicU64::new(0));
        let (controller, _ctx) = controller(test_config(30, None), host);
        let mut controller = controller.with_renderer(Box::new(FlakyRenderer {
            frames: Arc::clone(&frames),
        }));
        
        let report = controller.run().await.unwrap();
        
        assert_eq!(frames.load(Ordering::SeqCst), 0);
        assert_eq!(report.frames_rendered, 0);
    }
    
    #[tokio::test]
    async fn test_log_write_failure_still_signals_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("missing").join("run.json");
        let host = Arc::new(CountingHost::default());
        let (mut controller, _ctx) = controller(test_config(20, Some(log_path.clone())), Arc::clone(&host));
        
        let report = controller.run().await.unwrap();
        
        assert!(!report.is_success());
        assert!(matches!(report.log, LogOutcome::Failed { ref path, .. } if *path == log_path));
        assert!(report.shutdown_delivered);
        assert_eq!(host.shutdown_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state(), RunState::Terminated);
        assert!(!log_path.exists());
    }
    
    #[tokio::test]
    async fn test_records_defaults_when_no_producer_published() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(CountingHost::default());
        let (mut controller, _ctx) = controller(test_config(30, Some(dir.path().join("run.json"))), host);
        
        controller.run().await.unwrap();
        
        let log = controller.log().unwrap();
        assert_eq!(log.len(), 3);
        for record in log.state_records() {
            assert_eq!(*record, StateRecord::from(&VehicleState::default()));
        }
        for provenance in log.provenance() {
            assert_eq!(provenance.never_written().len(), 7);
        }
    }
    
    #[tokio::test]
    async fn test_records_latest_producer_values() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(CountingHost::default());
        let (mut controller, _ctx) = controller(test_config(30, Some(dir.path().join("run.json"))), host);
        
        let ports = controller.subscribe_producers();
        ports
            .vehicle_state
            .send(VehicleState {
                vx: 1.0,
                ..Default::default()
            })
            .await
            .unwrap();
        ports
            .vehicle_state
            .send(VehicleState {
                vx: 7.5,
                s: 12.0,
                ..Default::default()
            })
            .await
            .unwrap();
        ports
            .static_params
            .send(StaticVehicleParams {
                length_front_offset: 1.2,
                ..Default::default()
            })
            .await
            .unwrap();
        settle().await;
        
        controller.run().await.unwrap();
        
        let log = controller.log().unwrap();
        for record in log.state_records() {
            assert_eq!(record.vx, 7.5);
            assert_eq!(record.s, 12.0);
        }
        assert_eq!(log.provenance()[0].vehicle_state, 2);
        assert_eq!(controller.store().static_params().length_front_offset, 1.2);
    }
    
    #[tokio::test]
    async fn test_one_pacing_sleep_per_tick() {
        let host = Arc::new(CountingHost::default());
        let mut config = test_config(40, None);
        config.slowdown_factor = 2.0;
        let (mut controller, ctx) = controller(config, host);
        
        let report = controller.run().await.unwrap();
        
        assert_eq!(report.ticks, 4);
        assert_eq!(ctx.sleep_count(), 4);
        // 4 ticks × dt × slowdown of simulated wall time
        assert_eq!(ctx.now(), Duration::from_millis(80));
    }
    
    #[tokio::test]
    async fn test_zero_slowdown_does_not_advance_wall_time() {
        let host = Arc::new(CountingHost::default());
        let mut config = test_config(40, None);
        config.slowdown_factor = 0.0;
        let (mut controller, ctx) = controller(config, host);
        
        controller.run().await.unwrap();
        
        assert_eq!(ctx.now(), Duration::ZERO);
    }
    
    #[tokio::test]
    async fn test_partial_final_step_rounds_up() {
        let host = Arc::new(CountingHost::default());
        let (mut controller, _ctx) = controller(test_config(25, None), host);
        
        let report = controller.run().await.unwrap();
        
        assert_eq!(report.ticks, 3);
        assert_eq!(report.final_time, SimTime::from_nanos(30_000_000));
    }
    
    #[tokio::test]
    async fn test_run_after_terminate_is_rejected() {
        let host = Arc::new(CountingHost::default());
        let (mut controller, _ctx) = controller(test_config(10, None), Arc::clone(&host));
        
        controller.run().await.unwrap();
        let second = controller.run().await;
        
        assert!(matches!(second, Err(RunError::AlreadyTerminated)));
        assert_eq!(host.shutdown_calls.load(Ordering::SeqCst), 1);
    }
    
    #[test]
    fn test_load_config_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let params = dir.path().join("params.json");
        std::fs::write(
            &params,
            r#"{"t_final": 2.0, "do_liveplot": true, "save_logfile": false, "pathglobal_filepath": "pg.json"}"#,
        )
        .unwrap();
        
        let overrides = ExperimentParams {
            do_liveplot: Some(false),
            dt: Some(0.02),
            ..Default::default()
        };
        let config = load_config(Some(&params), overrides).unwrap();
        
        assert_eq!(config.horizon, Duration::from_secs(2));
        assert_eq!(config.dt, Duration::from_millis(20));
        assert!(!config.live_plot);
        assert!(config.log_filepath.is_none());
    }
    
    #[test]
    fn test_load_config_reports_missing_key() {
        let overrides = ExperimentParams {
            t_final: Some(1.0),
            ..Default::default()
        };
        let result = load_config(None, overrides);
        assert!(matches!(
            result,
            Err(RunError::Config(loopsim_core::ConfigError::Missing { key: "do_liveplot" }))
        ));
    }
    
    #[test]
    fn test_load_config_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("absent.json")), ExperimentParams::default());
        assert!(matches!(result, Err(RunError::Config(_))));
    }
    
    #[tokio::test]
    async fn test_initialize_fails_without_global_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(10, None);
        config.path_global = dir.path().join("nope.json");
        
        let result = RunController::initialize(config, VirtualContext::shared(), Arc::new(WatchHost::new()));
        
        assert!(matches!(result, Err(RunError::PathLoad(_))));
    }
    
    #[tokio::test]
    async fn test_initialize_loads_global_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pathglobal.json");
        std::fs::write(&path, r#"{"s": [0.0, 5.0], "X": [1.0, 2.0]}"#).unwrap();
        let mut config = test_config(10, None);
        config.path_global = path;
        
        let mut controller =
            RunController::initialize(config, VirtualContext::shared(), Arc::new(WatchHost::new())).unwrap();
        let report = controller.run().await.unwrap();
        
        assert_eq!(report.ticks, 1);
    }
}
