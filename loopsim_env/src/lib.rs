//! loopsim Environment Abstraction Layer
//!
//! This crate isolates everything the experiment coordinator needs from the
//! "outside world" so the run loop can execute in **real time** (tokio) or in
//! **virtual time** (tests, batch replays) without code changes.
//!
//! # What Is Abstracted
//!
//! - Wall-clock time and the pacing sleep (`now()`, `sleep()`)
//! - Background task spawning for producer ingestion
//! - The outbound host signals: the simulated-time channel and the
//!   one-shot shutdown notice
//!
//! # Example
//!
//! ```ignore
//! use loopsim_env::{LoopContext, HostTransport, SimTime};
//!
//! async fn pace<Ctx: LoopContext, Host: HostTransport>(ctx: &Ctx, host: &Host, t: SimTime) {
//!     host.publish_clock(t)?;
//!     ctx.sleep(Duration::from_millis(10)).await;
//! }
//! ```

mod context;
mod host;
mod types;
mod error;
mod tokio_impl;

pub use context::LoopContext;
pub use host::{HostTransport, HostReceivers, WatchHost};
pub use types::{SimTime, ShutdownNotice};
pub use error::EnvError;
pub use tokio_impl::TokioContext;
