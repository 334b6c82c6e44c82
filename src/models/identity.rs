use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An authenticated principal as returned by the API. Carries no credential
/// field at all, so a password hash can never leak through serialization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    /// Display name, trimmed, non-empty.
    pub name: String,
    /// Lowercased at registration; unique across all identities.
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Store-side identity record. This is the only type that carries the
/// password hash, and it never implements `Serialize`.
#[derive(Debug, Clone, FromRow)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl IdentityRecord {
    /// Builds a record for a new registration. The email is expected to be
    /// normalized (trimmed, lowercased) by the caller.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }

    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}
