//! Verifiers and key verification.

use crate::encoding::base64_array;
use crate::errors::KeyError;
use crate::hashing::{checksum, constant_time_eq, slow_hash, CHECKSUM_LEN, HASH_LEN, SALT_LEN};
use crate::key::Key;
use crate::random::random_array;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side counterpart of a [`Key`].
///
/// Holds `hash = PBKDF2(secret, salt)` and
/// `checksum = SHA256(group ‖ salt ‖ hash)`. The secret itself is not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verifier {
    /// Sensor group this verifier accepts keys for
    pub group: Uuid,
    /// Random salt for the slow hash
    #[serde(with = "base64_array")]
    pub salt: [u8; SALT_LEN],
    /// Slow hash of the key secret
    #[serde(with = "base64_array")]
    pub hash: [u8; HASH_LEN],
    /// Transcription checksum
    #[serde(with = "base64_array")]
    pub checksum: [u8; CHECKSUM_LEN],
}

/// Derive a verifier for `key` with a fresh random salt.
pub fn new_verifier(key: &Key) -> Result<Verifier, KeyError> {
    let salt = random_array::<SALT_LEN>()?;
    let hash = slow_hash(&key.secret, &salt);
    Ok(Verifier {
        group: key.group,
        checksum: verifier_checksum(&key.group, &salt, &hash),
        salt,
        hash,
    })
}

/// True iff the verifier checksum recomputes.
///
/// Used when loading configuration to reject mistyped verifiers.
pub fn is_verifier_valid(verifier: &Verifier) -> bool {
    constant_time_eq(
        &verifier_checksum(&verifier.group, &verifier.salt, &verifier.hash),
        &verifier.checksum,
    )
}

/// True iff `key` is accepted by `verifier`.
///
/// Requires matching groups, both checksums valid, and the slow hash of the
/// key secret under the verifier salt equal to the stored hash.
pub fn verify(key: &Key, verifier: &Verifier) -> bool {
    if key.group != verifier.group {
        return false;
    }

    if !key.is_checksum_valid() || !is_verifier_valid(verifier) {
        return false;
    }

    let candidate = slow_hash(&key.secret, &verifier.salt);
    constant_time_eq(&candidate, &verifier.hash)
}

fn verifier_checksum(group: &Uuid, salt: &[u8], hash: &[u8]) -> [u8; CHECKSUM_LEN] {
    checksum(&[group.as_bytes(), salt, hash])
}
