//! Operating system randomness.

use crate::errors::KeyError;
use crate::hashing::SECRET_LEN;
use rand::rngs::OsRng;
use rand::RngCore;

/// Fill `dest` from the operating system random source.
pub fn fill_random(dest: &mut [u8]) -> Result<(), KeyError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|e| KeyError::RandomSource(e.to_string()))
}

/// Generate `len` cryptographically random bytes.
pub fn random_bytes(len: usize) -> Result<Vec<u8>, KeyError> {
    let mut bytes = vec![0u8; len];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Generate a random fixed-size array.
pub fn random_array<const N: usize>() -> Result<[u8; N], KeyError> {
    let mut bytes = [0u8; N];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Generate a 64-byte secret suitable for token signing.
pub fn new_secret() -> Result<[u8; SECRET_LEN], KeyError> {
    random_array()
}
