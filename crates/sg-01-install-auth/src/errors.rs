//! Install key error types.

use thiserror::Error;

/// Errors raised while creating or decoding install keys and verifiers.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The operating system random source failed
    #[error("Random source failed: {0}")]
    RandomSource(String),

    /// A field was not valid standard base64
    #[error("Invalid base64 in {field}: {reason}")]
    InvalidEncoding {
        /// Field being decoded
        field: &'static str,
        /// Decoder message
        reason: String,
    },

    /// A field decoded to the wrong number of bytes
    #[error("Invalid length for {field}: expected {expected}, got {actual}")]
    InvalidLength {
        /// Field being decoded
        field: &'static str,
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },
}
