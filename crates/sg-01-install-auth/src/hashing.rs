//! Checksum and slow hash primitives.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Install key secret length in bytes.
pub const SECRET_LEN: usize = 64;

/// Verifier salt length in bytes.
pub const SALT_LEN: usize = 4;

/// Verifier hash length in bytes.
pub const HASH_LEN: usize = 32;

/// Checksum length in bytes (SHA-256 output).
pub const CHECKSUM_LEN: usize = 32;

/// PBKDF2 iteration count for verifier hashes.
pub const HASH_ITERATIONS: u32 = 10_000;

/// SHA-256 over the concatenation of `parts`.
pub fn checksum(parts: &[&[u8]]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// PBKDF2-HMAC-SHA256 of `secret` under `salt`.
pub fn slow_hash(secret: &[u8], salt: &[u8]) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(secret, salt, HASH_ITERATIONS, &mut out);
    out
}

/// Constant-time byte comparison.
///
/// Slices of different lengths compare unequal.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
