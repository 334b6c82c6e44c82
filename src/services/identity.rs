use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, AuthSession, TokenSigner};
use crate::error::{AppError, FieldError};
use crate::models::{Identity, IdentityRecord};
use crate::store::IdentityStore;

/// Registration, login, token verification, and profile lookup. Holds its
/// credential store and token signer as injected collaborators.
pub struct IdentityService {
    store: Arc<dyn IdentityStore>,
    signer: TokenSigner,
    /// Hash that unknown-email logins are verified against so they do the
    /// same bcrypt work as a wrong-password login.
    fallback_hash: String,
}

impl IdentityService {
    pub fn new(store: Arc<dyn IdentityStore>, signer: TokenSigner) -> Result<Self, AppError> {
        let fallback_hash = hash_password("taskvault.fallback.credential")?;
        Ok(Self {
            store,
            signer,
            fallback_hash,
        })
    }

    /// Creates an account and mints its first session token. The email is
    /// normalized to lowercase before the duplicate check and the insert, so
    /// uniqueness is case-insensitive end to end.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(vec![FieldError::new(
                "name",
                "Name is required",
            )]));
        }
        let email = email.trim().to_lowercase();

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password(password)?;
        let record = IdentityRecord::new(name.to_string(), email, password_hash);
        let identity = self.store.insert(record).await?;
        let token = self.signer.issue(identity.id)?;

        Ok(AuthSession { identity, token })
    }

    /// Authenticates an email/password pair. Unknown email and wrong
    /// password return the identical error; the hash comparison runs in both
    /// cases (against `fallback_hash` when the email is unknown) so the two
    /// paths cost the same.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let email = email.trim().to_lowercase();
        let record = self.store.find_by_email(&email).await?;

        let candidate_hash = record
            .as_ref()
            .map(|r| r.password_hash.as_str())
            .unwrap_or(self.fallback_hash.as_str());
        let password_matches = verify_password(password, candidate_hash)?;

        match record {
            Some(record) if password_matches => {
                let identity = record.into_identity();
                let token = self.signer.issue(identity.id)?;
                Ok(AuthSession { identity, token })
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    /// Resolves a session token to its identity id. Pure: signature and
    /// expiry only, no store access.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        Ok(self.signer.verify(token)?.sub)
    }

    pub async fn get_profile(&self, identity_id: Uuid) -> Result<Identity, AppError> {
        self.store
            .find_by_id(identity_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".into()))
    }
}
