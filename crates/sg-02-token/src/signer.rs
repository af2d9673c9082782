//! Signed claims capability and its HS256 implementation.

use crate::claims::Claims;
use crate::errors::TokenError;
use crate::secret::SigningSecret;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;

/// The only algorithm a token may declare.
pub const ALLOWED_ALGORITHM: &str = "HS256";

/// Signs claims into tokens and verifies tokens against one secret.
pub trait ClaimsSigner: Send + Sync {
    /// Produce a signed token for `claims`.
    fn sign(&self, claims: &Claims, secret: &SigningSecret) -> Result<String, TokenError>;

    /// Verify `token` under `secret` and return its claims.
    ///
    /// Returns [`TokenError::InvalidSignature`] when the signature does not
    /// match, so callers can fall through to another secret.
    fn verify(&self, token: &str, secret: &SigningSecret) -> Result<Claims, TokenError>;
}

/// JWT signer pinned to HS256 with zero clock leeway.
#[derive(Debug, Clone)]
pub struct Hs256Signer {
    validation: Validation,
}

impl Hs256Signer {
    /// Create a signer.
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iat"]);
        Self { validation }
    }
}

impl Default for Hs256Signer {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimsSigner for Hs256Signer {
    fn sign(&self, claims: &Claims, secret: &SigningSecret) -> Result<String, TokenError> {
        let key = EncodingKey::from_secret(secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), claims, &key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, secret: &SigningSecret) -> Result<Claims, TokenError> {
        check_algorithm(token)?;

        let key = DecodingKey::from_secret(secret.as_bytes());
        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidAlgorithm => TokenError::Algorithm(e.to_string()),
            _ => TokenError::Malformed(e.to_string()),
        })?;

        Ok(data.claims)
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Reject tokens whose header declares anything other than HS256.
///
/// Reads the header directly so unsupported values such as `none` surface
/// as [`TokenError::Algorithm`] rather than a parse failure.
pub fn check_algorithm(token: &str) -> Result<(), TokenError> {
    let segment = token
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TokenError::Malformed("missing header".into()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("header encoding: {}", e)))?;
    let header: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("header json: {}", e)))?;

    if header.alg != ALLOWED_ALGORITHM {
        return Err(TokenError::Algorithm(header.alg));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn secret(byte: u8) -> SigningSecret {
        SigningSecret::from_bytes([byte; 64])
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn claims_at(now: i64, duration: i64) -> Claims {
        Claims::new(Uuid::new_v4(), Uuid::new_v4(), now, duration)
    }

    fn forge(header_json: &str, claims: &Claims, signature: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(header_json);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{}.{}.{}", header, payload, signature)
    }

    #[test]
    fn test_sign_verify() {
        let signer = Hs256Signer::new();
        let claims = claims_at(now(), 60);
        let token = signer.sign(&claims, &secret(1)).unwrap();
        assert_eq!(signer.verify(&token, &secret(1)).unwrap(), claims);
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let signer = Hs256Signer::new();
        let token = signer.sign(&claims_at(now(), 60), &secret(1)).unwrap();
        assert_eq!(
            signer.verify(&token, &secret(2)),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_none_algorithm_rejected() {
        let signer = Hs256Signer::new();
        let token = forge(r#"{"alg":"none","typ":"JWT"}"#, &claims_at(now(), 60), "");
        assert_eq!(
            signer.verify(&token, &secret(1)),
            Err(TokenError::Algorithm("none".into()))
        );
    }

    #[test]
    fn test_hs512_rejected_even_with_correct_secret() {
        let signer = Hs256Signer::new();
        let key = EncodingKey::from_secret(secret(1).as_bytes());
        let token = encode(&Header::new(Algorithm::HS512), &claims_at(now(), 60), &key).unwrap();
        assert_eq!(
            signer.verify(&token, &secret(1)),
            Err(TokenError::Algorithm("HS512".into()))
        );
    }

    #[test]
    fn test_expired_rejected() {
        let signer = Hs256Signer::new();
        let claims = claims_at(now() - 120, 60);
        let token = signer.sign(&claims, &secret(1)).unwrap();
        assert_eq!(signer.verify(&token, &secret(1)), Err(TokenError::Expired));
    }

    #[test]
    fn test_not_before_enforced() {
        let signer = Hs256Signer::new();
        let mut claims = claims_at(now(), 600);
        claims.nbf = now() + 300;
        let token = signer.sign(&claims, &secret(1)).unwrap();
        assert_eq!(
            signer.verify(&token, &secret(1)),
            Err(TokenError::NotYetValid)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = Hs256Signer::new();
        let token = signer.sign(&claims_at(now(), 60), &secret(1)).unwrap();
        let signature = token.rsplit('.').next().unwrap();
        let forged = forge(r#"{"alg":"HS256","typ":"JWT"}"#, &claims_at(now(), 60), signature);
        assert_eq!(
            signer.verify(&forged, &secret(1)),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = Hs256Signer::new();
        assert!(matches!(
            signer.verify("", &secret(1)),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            signer.verify("abc.def", &secret(1)),
            Err(TokenError::Malformed(_))
        ));
    }
}
