use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use chrono::Duration;
use serde_json::json;
use std::sync::Arc;

use taskvault::auth::{AuthMiddleware, TokenSigner};
use taskvault::routes;
use taskvault::routes::health;
use taskvault::services::{IdentityService, StatsAggregator, TaskService};
use taskvault::store::{MemoryIdentityStore, MemoryTaskStore, TaskStore};

const TEST_SECRET: &str = "integration-test-secret";

struct TestContext {
    identity_service: web::Data<IdentityService>,
    task_service: web::Data<TaskService>,
    stats_aggregator: web::Data<StatsAggregator>,
    signer: TokenSigner,
}

// Fresh in-memory stores per test, so cases are fully isolated.
fn test_context() -> TestContext {
    let signer = TokenSigner::new(TEST_SECRET, Duration::days(7));
    let task_store: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::default());
    TestContext {
        identity_service: web::Data::new(
            IdentityService::new(Arc::new(MemoryIdentityStore::default()), signer.clone())
                .expect("identity service"),
        ),
        task_service: web::Data::new(TaskService::new(task_store.clone())),
        stats_aggregator: web::Data::new(StatsAggregator::new(task_store)),
        signer,
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data($ctx.identity_service.clone())
                .app_data($ctx.task_service.clone())
                .app_data($ctx.stats_aggregator.clone())
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware::new($ctx.signer.clone()))
                        .configure(routes::config),
                ),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let ctx = test_context();
    let app = init_app!(ctx);

    // Register a new account; the email should come back lowercased.
    let register_payload = json!({
        "name": "Integration User",
        "email": "Integration@Example.com",
        "password": "Password123!"
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["identity"]["name"], "Integration User");
    assert_eq!(body["data"]["identity"]["email"], "integration@example.com");
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));

    // The identity must never expose a credential field.
    let identity = body["data"]["identity"].as_object().unwrap();
    assert!(!identity.contains_key("password"));
    assert!(!identity.contains_key("passwordHash"));

    // Registering the same email again, with different case, fails.
    let conflict_payload = json!({
        "name": "Impostor",
        "email": "INTEGRATION@example.com",
        "password": "Different456!"
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&conflict_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], "An account already exists with this email");

    // Login and use the token on a protected route.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&json!({
            "email": "integration@example.com",
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Login successful");
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let identity_id = body["data"]["identity"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["id"], json!(identity_id));
    assert!(body["data"].as_object().unwrap().get("password").is_none());
}

#[actix_rt::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = test_context();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "name": "Login User",
            "email": "login_user@example.com",
            "password": "Password123!"
        }))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let wrong_password_req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&json!({
            "email": "login_user@example.com",
            "password": "WrongPassword123!"
        }))
        .to_request();
    let wrong_password_resp = test::call_service(&app, wrong_password_req).await;
    let wrong_password_status = wrong_password_resp.status();
    let wrong_password_body = test::read_body(wrong_password_resp).await;

    let unknown_email_req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&json!({
            "email": "nonexistent@example.com",
            "password": "Password123!"
        }))
        .to_request();
    let unknown_email_resp = test::call_service(&app, unknown_email_req).await;
    let unknown_email_status = unknown_email_resp.status();
    let unknown_email_body = test::read_body(unknown_email_resp).await;

    assert_eq!(
        wrong_password_status,
        actix_web::http::StatusCode::UNAUTHORIZED
    );
    assert_eq!(unknown_email_status, wrong_password_status);
    // Byte-identical bodies: nothing reveals which check failed.
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let ctx = test_context();
    let app = init_app!(ctx);

    let test_cases = vec![
        (
            json!({ "email": "test@example.com", "password": "Password123!" }),
            "missing name",
        ),
        (
            json!({ "name": "Test User", "password": "Password123!" }),
            "missing email",
        ),
        (
            json!({ "name": "Test User", "email": "invalid-email", "password": "Password123!" }),
            "invalid email format",
        ),
        (
            json!({ "name": "Test User", "email": "test@example.com", "password": "123" }),
            "password too short",
        ),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::BAD_REQUEST,
            "Test case failed: {}",
            description
        );
    }

    // Shape-gate failures report the offending field.
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "name": "Test User",
            "email": "invalid-email",
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][0]["message"], "A valid email is required");
}

#[actix_rt::test]
async fn test_token_lifecycle() {
    let ctx = test_context();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "name": "Token User",
            "email": "token_user@example.com",
            "password": "Password123!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let identity_id = body["data"]["identity"]["id"].as_str().unwrap().to_string();

    // No token at all.
    let req = test::TestRequest::get().uri("/api/auth/profile").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // Garbage token.
    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .append_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid token");

    // A token signed with the right secret but already past its expiry.
    let expired_signer = TokenSigner::new(TEST_SECRET, Duration::hours(-2));
    let expired_token = expired_signer
        .issue(identity_id.parse().unwrap())
        .expect("issue expired token");

    let req = test::TestRequest::get()
        .uri("/api/auth/profile")
        .append_header(("Authorization", format!("Bearer {}", expired_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Token has expired");
}
