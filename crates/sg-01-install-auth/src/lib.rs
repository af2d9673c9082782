//! # SG-01 Install Auth - Install Keys and Verifiers
//!
//! An administrator generates a [`Key`] for a sensor group and embeds it in
//! the sensor configuration. The gateway keeps only the matching
//! [`Verifier`], which holds a salted PBKDF2 hash of the key secret.
//!
//! ## Components
//!
//! | Item | Contents | Algorithm |
//! |------|----------|-----------|
//! | [`Key`] | group, 64-byte secret, checksum | `SHA256(group ‖ secret)` |
//! | [`Verifier`] | group, 4-byte salt, hash, checksum | `PBKDF2-HMAC-SHA256(secret, salt, 10000)`, `SHA256(group ‖ salt ‖ hash)` |
//!
//! ## Security Properties
//!
//! - **Checksums** only catch transcription errors and corrupted config.
//! - **Hash** is the security boundary. It is slow and salted so a leaked
//!   verifier does not make the secret cheap to brute force.
//! - [`verify`] never fails loudly. Malformed input is simply not verified.
//! - Checksum and hash comparisons are constant time.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod encoding;
pub mod errors;
pub mod hashing;
pub mod key;
pub mod random;
pub mod verifier;

// Re-exports
pub use errors::KeyError;
pub use hashing::{CHECKSUM_LEN, HASH_ITERATIONS, HASH_LEN, SALT_LEN, SECRET_LEN};
pub use key::{new_key, Key};
pub use random::{new_secret, random_bytes};
pub use verifier::{is_verifier_valid, new_verifier, verify, Verifier};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
