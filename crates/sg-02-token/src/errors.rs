//! Token error types.

use thiserror::Error;

/// Token issuing and verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token could not be parsed
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Token declares an algorithm outside the allow-list
    #[error("Algorithm not allowed: {0}")]
    Algorithm(String),

    /// No configured secret produced a matching signature
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is past its expiry
    #[error("Token has expired")]
    Expired,

    /// Token is not valid yet
    #[error("Token not yet valid")]
    NotYetValid,

    /// Signing a new token failed
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// A signing secret could not be decoded
    #[error("Invalid signing secret: {0}")]
    InvalidSecret(String),
}
