use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the identity's id.
    pub sub: Uuid,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues and verifies session tokens for a fixed signing secret and
/// time-to-live. Constructed once from configuration and injected wherever
/// tokens are handled; verification is a pure function of the token, the
/// secret, and the clock.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Mints a token for the given identity, expiring `ttl` from now.
    pub fn issue(&self, identity_id: Uuid) -> Result<String, AppError> {
        let expiration = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::internal("token expiry out of range"))?
            .timestamp() as usize;

        let claims = Claims {
            sub: identity_id,
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verifies signature and expiry, returning the claims.
    ///
    /// Expired tokens yield `AppError::TokenExpired`; anything else wrong
    /// with the token yields `AppError::InvalidToken`. Expiry is checked
    /// with zero leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test_secret_for_gen_verify", Duration::days(7))
    }

    #[test]
    fn test_token_generation_and_verification() {
        let identity_id = Uuid::new_v4();
        let token = signer().issue(identity_id).unwrap();
        let claims = signer().verify(&token).unwrap();
        assert_eq!(claims.sub, identity_id);
    }

    #[test]
    fn test_token_expiration() {
        // A negative TTL produces a token that is already expired.
        let expired_signer = TokenSigner::new("test_secret_for_gen_verify", Duration::hours(-2));
        let token = expired_signer.issue(Uuid::new_v4()).unwrap();

        match signer().verify(&token) {
            Err(AppError::TokenExpired) => {}
            Ok(_) => panic!("Token should have been rejected as expired"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = signer().issue(Uuid::new_v4()).unwrap();
        let other = TokenSigner::new("a_completely_different_secret", Duration::days(7));

        match other.verify(&token) {
            Err(AppError::InvalidToken) => {}
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token() {
        match signer().verify("not.a.jwt") {
            Err(AppError::InvalidToken) => {}
            other => panic!("Expected InvalidToken, got {:?}", other),
        }
    }
}
