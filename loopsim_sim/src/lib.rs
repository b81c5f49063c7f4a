//! loopsim run loop - the fixed-step clock coordinator
//!
//! This crate drives a closed-loop trajectory experiment: it owns simulated
//! time, fans the latest producer values out to the consumers, and ends the
//! run cleanly.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        RunController                         │
//! │                                                              │
//! │  producers ──mpsc──► ingest tasks ──► SnapshotStore          │
//! │                                          │ (read, never wait)│
//! │   ┌──────────────────────────────────────▼────────────────┐  │
//! │   │ tick: capture ─► advance + publish t ─► log ─► render │  │
//! │   └──────────────────────────────┬────────────────────────┘  │
//! │                                  │ pacing sleep              │
//! │                     LoopContext ─┘                           │
//! │                                                              │
//! │  HostTransport ◄── clock every tick, shutdown notice once    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use loopsim_sim::{RunController, VirtualContext};
//! use loopsim_env::WatchHost;
//!
//! let mut controller = RunController::initialize(config, VirtualContext::shared(), Arc::new(WatchHost::new()))?;
//! let ports = controller.subscribe_producers();
//! let report = controller.run().await?;
//! ```

mod clock;
mod context;
mod error;
mod stop;
pub mod ingest;
pub mod logger;
pub mod runner;
pub mod visualizer;

pub use clock::{ClockCoordinator, PacingPolicy};
pub use context::VirtualContext;
pub use error::RunError;
pub use ingest::{forward_json_lines, subscribe_all, ProducerPorts};
pub use logger::{LoadedArtifact, LogWriteError, StateRecord, TimeSeriesLog};
pub use runner::{load_config, ExitReason, LogOutcome, RunController, RunReport, RunState};
pub use stop::StopSignal;
pub use visualizer::{FrameRenderer, LiveVisualizer, RenderError};
