//! loopsim CLI
//!
//! Runs one closed-loop experiment against the real wall clock.

use clap::Parser;
use loopsim_core::ExperimentParams;
use loopsim_env::{TokioContext, WatchHost};
use loopsim_sim::{forward_json_lines, load_config, LogOutcome, PacingPolicy, RunController};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Closed-loop trajectory experiment coordinator
#[derive(Parser, Debug)]
#[command(name = "loopsim")]
#[command(about = "Fixed-step clock coordinator with live plot and time-series log")]
struct Args {
    /// JSON parameter file; command-line values override it
    #[arg(short, long)]
    params: Option<PathBuf>,
    
    /// Simulation horizon in seconds
    #[arg(long)]
    t_final: Option<f64>,
    
    /// Simulation step in seconds
    #[arg(long)]
    dt: Option<f64>,
    
    /// Enable the live visualizer
    #[arg(long)]
    do_liveplot: Option<bool>,
    
    /// Write the time-series log at the end of the run
    #[arg(long)]
    save_logfile: Option<bool>,
    
    /// Destination of the log artifact
    #[arg(long)]
    log_filepath: Option<PathBuf>,
    
    /// Global path artifact (JSON)
    #[arg(long)]
    pathglobal_filepath: Option<PathBuf>,
    
    /// Wall-time multiplier for pacing (1 = real time, 0 = unpaced)
    #[arg(long)]
    slowdown_factor: Option<f64>,
    
    /// Read producer updates as JSON lines from stdin
    #[arg(long)]
    stdin_updates: bool,
    
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ExperimentParams {
        ExperimentParams {
            t_final: self.t_final,
            dt: self.dt,
            do_liveplot: self.do_liveplot,
            save_logfile: self.save_logfile,
            log_filepath: self.log_filepath.clone(),
            pathglobal_filepath: self.pathglobal_filepath.clone(),
            slowdown_factor: self.slowdown_factor,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    
    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
    
    info!("loopsim v{}", env!("CARGO_PKG_VERSION"));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    
    let config = match load_config(args.params.as_deref(), args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    
    info!("  Horizon:  {:?}", config.horizon);
    info!("  Step:     {:?}", config.dt);
    info!("  Pacing:   {:?}", PacingPolicy::from_step(config.dt, config.slowdown_factor));
    info!("  Liveplot: {}", config.live_plot);
    if let Some(path) = &config.log_filepath {
        info!("  Log:      {}", path.display());
    }
    
    let context = TokioContext::shared();
    let host = Arc::new(WatchHost::new());
    
    let mut controller = match RunController::initialize(config, context, host) {
        Ok(controller) => controller,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    
    let ports = controller.subscribe_producers();
    if args.stdin_updates {
        tokio::spawn(async move {
            let forwarded = forward_json_lines(BufReader::new(tokio::io::stdin()), ports).await;
            info!("stdin update stream closed after {} updates", forwarded);
        });
    }
    
    let stop = controller.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping at the next tick");
            stop.request_stop();
        }
    });
    
    let report = match controller.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        "Run complete: {} ticks, t = {}, {:?}",
        report.ticks, report.final_time, report.exit_reason
    );
    if report.frames_skipped > 0 {
        warn!("{} frames skipped", report.frames_skipped);
    }
    match &report.log {
        LogOutcome::Written { path, records } => info!("Log: {} records in {}", records, path.display()),
        LogOutcome::Failed { path, error } => error!("Log not written to {}: {}", path.display(), error),
        LogOutcome::Disabled => {}
    }
    
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
