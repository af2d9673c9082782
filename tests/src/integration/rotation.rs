//! # Signing Secret Rotation
//!
//! A gateway restarted with a new current secret keeps accepting tokens
//! signed under the old one while it is listed as a past secret, and stops
//! once it is removed.

#[cfg(test)]
mod tests {
    use sg_02_token::{SigningSecret, TokenError, TokenProcessor};
    use std::time::Duration;
    use uuid::Uuid;

    fn secret(byte: u8) -> SigningSecret {
        SigningSecret::from_bytes([byte; 64])
    }

    fn processor(current: u8, past: &[u8]) -> TokenProcessor {
        TokenProcessor::new(
            secret(current),
            past.iter().copied().map(secret).collect(),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_rotation_keeps_old_tokens_valid() {
        let (group, sensor) = (Uuid::new_v4(), Uuid::new_v4());

        let before = processor(1, &[]);
        let old_token = before.new_token(group, sensor).unwrap().token;

        // Restarted with secret 2 current and secret 1 retired to past.
        let after = processor(2, &[1]);
        let claims = after.verify_token(&old_token).unwrap();
        assert_eq!(claims.sensor, sensor);
        assert_eq!(claims.group, group);

        // New tokens use the new secret and are unknown to the old gateway.
        let new_token = after.new_token(group, sensor).unwrap().token;
        assert_eq!(
            before.verify_token(&new_token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_dropped_secret_invalidates_tokens() {
        let (group, sensor) = (Uuid::new_v4(), Uuid::new_v4());
        let old_token = processor(1, &[]).new_token(group, sensor).unwrap().token;

        let rotated_out = processor(3, &[2]);
        assert_eq!(
            rotated_out.verify_token(&old_token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_any_past_secret_position() {
        let (group, sensor) = (Uuid::new_v4(), Uuid::new_v4());
        let token = processor(5, &[]).new_token(group, sensor).unwrap().token;

        let gateway = processor(9, &[7, 6, 5]);
        assert_eq!(gateway.verify_token(&token).unwrap().sensor, sensor);
    }
}
