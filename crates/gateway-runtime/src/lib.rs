//! # Sensor Gateway Runtime Library
//!
//! Exposes the runtime modules for testing. The entry point is the
//! `main.rs` binary.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then `SG_` environment overrides)
//! 2. Validate secrets, verifiers and outputs
//! 3. Build the output router (spawns sink tasks)
//! 4. Serve the sensor API until SIGINT/SIGTERM
//! 5. Drain HTTP, then drain outputs

#![allow(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod logging;
pub mod server;

pub use config::{ConfigError, GatewayConfig};
