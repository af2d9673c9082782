//! Standard base64 encoding for fixed-length byte fields.
//!
//! Keys, verifiers and token secrets travel as padded standard base64. A
//! value that decodes to the wrong length is rejected at decode time.

use crate::errors::KeyError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode bytes as padded standard base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode padded standard base64 into exactly `N` bytes.
pub fn decode_fixed<const N: usize>(field: &'static str, value: &str) -> Result<[u8; N], KeyError> {
    let bytes = STANDARD
        .decode(value.as_bytes())
        .map_err(|e| KeyError::InvalidEncoding {
            field,
            reason: e.to_string(),
        })?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| KeyError::InvalidLength {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

/// Serde adapter for `[u8; N]` fields stored as base64 strings.
pub mod base64_array {
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialize as padded standard base64.
    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::encode(bytes))
    }

    /// Deserialize from padded standard base64, enforcing the length.
    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_fixed::<N>("bytes", &s).map_err(de::Error::custom)
    }
}
