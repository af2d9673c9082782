//! Install keys.

use crate::encoding::base64_array;
use crate::errors::KeyError;
use crate::hashing::{checksum, constant_time_eq, CHECKSUM_LEN, SECRET_LEN};
use crate::random::random_array;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Install key embedded in sensor configuration.
///
/// `checksum = SHA256(group ‖ secret)`, where the group contributes its 16
/// raw bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Sensor group this key installs into
    pub group: Uuid,
    /// Random secret, never stored by the gateway
    #[serde(with = "base64_array")]
    pub secret: [u8; SECRET_LEN],
    /// Transcription checksum
    #[serde(with = "base64_array")]
    pub checksum: [u8; CHECKSUM_LEN],
}

impl Key {
    /// Recompute the checksum and compare it with the stored one.
    pub fn is_checksum_valid(&self) -> bool {
        constant_time_eq(&key_checksum(&self.group, &self.secret), &self.checksum)
    }
}

// The secret must never reach logs.
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("group", &self.group)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Generate a fresh install key for `group`.
pub fn new_key(group: Uuid) -> Result<Key, KeyError> {
    let secret = random_array::<SECRET_LEN>()?;
    Ok(Key {
        group,
        checksum: key_checksum(&group, &secret),
        secret,
    })
}

pub(crate) fn key_checksum(group: &Uuid, secret: &[u8]) -> [u8; CHECKSUM_LEN] {
    checksum(&[group.as_bytes(), secret])
}
