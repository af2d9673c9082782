//! # SG-02 Token - Sensor Bearer Tokens
//!
//! Issues and verifies the bearer tokens that bind a sensor identity to its
//! group once an install key has been accepted.
//!
//! ## Secret Rotation
//!
//! ```text
//! sign:    current ──────────────────────────────► token
//! verify:  token ─► current ─► past[0] ─► past[1] ─► ... ─► reject
//! ```
//!
//! Operators add a new current secret and demote the old one to the past
//! list. Tokens signed under the old secret keep validating until they expire.
//!
//! ## Algorithm Pinning
//!
//! Only HS256 is accepted. The algorithm declared in a token header is checked
//! against the allow-list before any secret is tried, so `none` and algorithm
//! substitution are rejected outright.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod claims;
pub mod errors;
pub mod processor;
pub mod secret;
pub mod signer;

// Re-exports
pub use claims::Claims;
pub use errors::TokenError;
pub use processor::{IssuedToken, TokenProcessor, DEFAULT_TOKEN_DURATION};
pub use secret::{SigningSecret, SIGNING_SECRET_LEN};
pub use signer::{ClaimsSigner, Hs256Signer, ALLOWED_ALGORITHM};
