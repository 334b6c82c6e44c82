pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Identity;

// Re-export necessary items
pub use extractors::AuthenticatedIdentity;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};

/// Represents the payload for a new registration request.
///
/// These derive-style checks are the request-shape gate: they run before the
/// identity service sees the payload, and their failures are reported as the
/// same field-error list the domain validation produces.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account.
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    /// Email address for the new account; uniqueness is case-insensitive.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Password for the new account.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Represents the payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Result of a successful registration or login: the identity (with no
/// credential field) and a freshly minted session token.
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub identity: Identity,
    pub token: String,
}
