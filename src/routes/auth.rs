use crate::{
    auth::{AuthenticatedIdentity, LoginRequest, RegisterRequest},
    error::AppError,
    services::IdentityService,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new account
///
/// Validates the request shape, creates the identity, and returns it with a
/// freshly minted session token.
#[post("/register")]
pub async fn register(
    service: web::Data<IdentityService>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let session = service
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Account registered successfully",
        "data": session,
    })))
}

/// Login
///
/// Authenticates an email/password pair and returns the identity with a new
/// session token. Unknown email and wrong password are indistinguishable.
#[post("/login")]
pub async fn login(
    service: web::Data<IdentityService>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let session = service.login(&payload.email, &payload.password).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful",
        "data": session,
    })))
}

/// Current account profile, resolved from the bearer token.
#[get("/profile")]
pub async fn profile(
    service: web::Data<IdentityService>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    let profile = service.get_profile(identity.0).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": profile,
    })))
}
