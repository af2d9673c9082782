//! # SG-04 Output - Event Sinks
//!
//! Delivers parsed events to every configured destination without ever
//! blocking the HTTP request path.
//!
//! ## Architecture
//!
//! ```text
//!                      ┌──────────────────┐
//!   batch ───────────► │   OutputRouter   │  collects per-sink failures
//!                      └───────┬──────────┘
//!              ┌───────────────┴────────────────┐
//!              ▼                                ▼
//!      ┌──────────────┐               ┌──────────────────┐
//!      │  StdoutSink  │               │  FilesystemSink  │
//!      │ queue ─► task│               │  group ─► writer │ (one per group)
//!      └──────────────┘               └────────┬─────────┘
//!                                              ▼
//!                                  <dir>/<group>/.<name>.json   (writing)
//!                                  <dir>/<group>/<name>.json    (complete)
//! ```
//!
//! ## Backpressure
//!
//! Every sink enqueues with `try_send`. A full queue drops the event and the
//! sink reports the loss in its `consume` result. Slow disks never stall
//! request handling.
//!
//! ## Shutdown
//!
//! [`OutputRouter::shutdown`] closes every sink, which closes their queues.
//! Writers drain what was already queued, finalize their files and exit.
//! The router waits up to a grace period for that to finish.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod filesystem;
mod lifecycle;
pub mod router;
pub mod sink;
pub mod stdout;

// Re-exports
pub use config::{build_router, OutputConfig};
pub use errors::{OutputError, SinkError};
pub use filesystem::{FileSettings, FilesystemSink};
pub use router::OutputRouter;
pub use sink::Sink;
pub use stdout::StdoutSink;

/// Default capacity of every sink queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;
