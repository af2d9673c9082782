//! # Sensor Gateway Test Suite
//!
//! Cross-crate flows that no single crate can test on its own.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── end_to_end.rs   # install ─► events ─► files on disk
//!     ├── rotation.rs     # secret rotation across processors
//!     └── pipeline.rs     # many sensors and groups into one sink
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sg-tests
//! cargo test -p sg-tests integration::end_to_end
//! ```

pub mod integration;
pub mod support;
