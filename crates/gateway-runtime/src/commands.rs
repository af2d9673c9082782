//! Offline commands: key and secret generation.

use anyhow::{ensure, Context};
use serde::Serialize;
use sg_01_install_auth::{new_key, new_secret, new_verifier, verify, Key, Verifier};
use sg_02_token::SigningSecret;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct KeyOutput {
    key: Key,
    verifier: Verifier,
}

#[derive(Debug, Serialize)]
struct SecretOutput {
    secret: SigningSecret,
}

/// New install key and its verifier as pretty JSON. A random group is used
/// when none is given.
pub fn generate_key(group: Option<Uuid>) -> anyhow::Result<String> {
    let group = group.unwrap_or_else(Uuid::new_v4);
    let key = new_key(group).context("Failed to generate install key")?;
    let verifier = new_verifier(&key).context("Failed to derive verifier")?;

    ensure!(
        verify(&key, &verifier),
        "Generated key does not verify against its own verifier"
    );

    serde_json::to_string_pretty(&KeyOutput { key, verifier }).context("Failed to encode key")
}

/// New token signing secret as pretty JSON.
pub fn generate_secret() -> anyhow::Result<String> {
    let secret = SigningSecret::from_bytes(new_secret().context("Failed to generate secret")?);
    serde_json::to_string_pretty(&SecretOutput { secret }).context("Failed to encode secret")
}
