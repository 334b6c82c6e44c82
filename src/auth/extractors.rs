use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// Extracts the verified identity id from request extensions.
///
/// Intended for routes wrapped by `AuthMiddleware`, which validates the
/// bearer token and inserts this value. If the middleware did not run the
/// extractor rejects the request with 401 rather than exposing anything.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedIdentity(pub Uuid);

impl FromRequest for AuthenticatedIdentity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedIdentity>().copied() {
            Some(identity) => ready(Ok(identity)),
            None => ready(Err(AppError::InvalidToken.into())),
        }
    }
}
