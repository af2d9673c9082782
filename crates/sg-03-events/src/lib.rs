//! # SG-03 Events - Sensor Event Model
//!
//! Turns the untrusted JSON a sensor submits into typed events stamped with
//! the authenticated sensor and group.
//!
//! ## Parsing Pipeline
//!
//! ```text
//! body ─► JSON array ─► element ─► envelope check ─► registry lookup
//!                          │         (type, time)        │
//!                          │                             ├─ registered ─► typed parser ─► Event
//!                          │                             └─ unknown ────► Event::Unknown
//!                          └─ any failure: log, skip element, continue
//! ```
//!
//! The `sensor` and `group` fields of every event are always overwritten
//! with the values taken from the bearer token. Payload identity is ignored.
//!
//! ## Registry
//!
//! [`ParserRegistry`] is built once at startup and shared by reference.
//! There is no global parser table.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod errors;
pub mod event;
pub mod parsers;
pub mod registry;
pub mod validation;

// Re-exports
pub use errors::EventError;
pub use event::{Event, EventType, InstallEvent, SensorEvent, WindowEvent, WindowLocationEvent};
pub use registry::{ParseFn, ParserRegistry};
