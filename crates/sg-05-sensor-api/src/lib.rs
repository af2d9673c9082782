// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! SG-05 Sensor API - HTTP endpoints used by browser sensors.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        SENSOR API (sg-05)                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   POST /install                      POST /events                 │
//! │   ─────────────                      ────────────                 │
//! │   media type check                   media type check             │
//! │   key ─► verifiers[group]            bearer ─► TokenProcessor     │
//! │   bearer? ─► reuse sensor            body ─► ParserRegistry       │
//! │   TokenProcessor.new_token           batch ─► OutputRouter        │
//! │   Install event ─► OutputRouter                                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Status Codes
//!
//! | Condition | Status |
//! |-----------|--------|
//! | Content-Type not `application/json` | 415 |
//! | Malformed body, bad install key, malformed or missing bearer | 400 |
//! | Invalid or expired token on `/events` | 401 |
//! | Body over the size limit | 413 |
//! | Output delivery failure on `/events` | 500 |

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod events;
pub mod install;
pub mod service;
pub mod state;

// Re-exports
pub use error::ApiError;
pub use install::{InstallRequest, InstallResponse};
pub use service::{router, DEFAULT_MAX_BODY_BYTES};
pub use state::SensorApi;
