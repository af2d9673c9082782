//! Signing secrets.

use crate::errors::TokenError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Signing secret length in bytes.
pub const SIGNING_SECRET_LEN: usize = 64;

/// HS256 signing secret, configured as padded standard base64.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret([u8; SIGNING_SECRET_LEN]);

impl SigningSecret {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; SIGNING_SECRET_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Padded standard base64 form.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

impl FromStr for SigningSecret {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = STANDARD
            .decode(s.trim().as_bytes())
            .map_err(|e| TokenError::InvalidSecret(e.to_string()))?;
        let array = <[u8; SIGNING_SECRET_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
            TokenError::InvalidSecret(format!(
                "expected {} bytes, got {}",
                SIGNING_SECRET_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

impl Serialize for SigningSecret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for SigningSecret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
