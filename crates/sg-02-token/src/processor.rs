//! Token issuing and verification across rotated secrets.

use crate::claims::Claims;
use crate::errors::TokenError;
use crate::secret::SigningSecret;
use crate::signer::{check_algorithm, ClaimsSigner, Hs256Signer};
use std::iter;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

/// Default token lifetime (28 days).
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::from_secs(28 * 24 * 60 * 60);

/// A freshly signed token with its validity window in unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Signed token string
    pub token: String,
    /// Issued at
    pub issued_at: i64,
    /// Expires at
    pub expires_at: i64,
}

/// Issues tokens under the current secret and verifies them under the
/// current secret or any past secret.
pub struct TokenProcessor<S = Hs256Signer> {
    current: SigningSecret,
    past: Vec<SigningSecret>,
    duration: Duration,
    signer: S,
}

impl TokenProcessor<Hs256Signer> {
    /// Create a processor using the HS256 signer.
    pub fn new(current: SigningSecret, past: Vec<SigningSecret>, duration: Duration) -> Self {
        Self::with_signer(current, past, duration, Hs256Signer::new())
    }
}

impl<S: ClaimsSigner> TokenProcessor<S> {
    /// Create a processor with a custom signer.
    pub fn with_signer(
        current: SigningSecret,
        past: Vec<SigningSecret>,
        duration: Duration,
        signer: S,
    ) -> Self {
        Self {
            current,
            past,
            duration,
            signer,
        }
    }

    /// Configured token lifetime.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Sign a new token for `sensor` in `group` with the current secret.
    pub fn new_token(&self, group: Uuid, sensor: Uuid) -> Result<IssuedToken, TokenError> {
        let now = unix_now();
        let duration = i64::try_from(self.duration.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims::new(group, sensor, now, duration);
        let token = self.signer.sign(&claims, &self.current)?;

        Ok(IssuedToken {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Verify `token` and return its claims.
    ///
    /// The declared algorithm is checked first. Secrets are then tried in
    /// order: current, then past. Only a signature mismatch falls through to
    /// the next secret.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        check_algorithm(token)?;

        for (index, secret) in iter::once(&self.current).chain(&self.past).enumerate() {
            match self.signer.verify(token, secret) {
                Ok(claims) => {
                    if index > 0 {
                        debug!(secret_index = index, "Token verified with past secret");
                    }
                    return Ok(claims);
                }
                Err(TokenError::InvalidSignature) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(TokenError::InvalidSignature)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
