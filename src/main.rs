use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;

use taskvault::auth::AuthMiddleware;
use taskvault::config::Config;
use taskvault::routes;
use taskvault::services::{IdentityService, StatsAggregator, TaskService};
use taskvault::store::{PgIdentityStore, PgTaskStore, TaskStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let signer = config.token_signer();
    let task_store: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool.clone()));

    let identity_service = web::Data::new(
        IdentityService::new(Arc::new(PgIdentityStore::new(pool.clone())), signer.clone())
            .expect("Failed to construct identity service"),
    );
    let task_service = web::Data::new(TaskService::new(task_store.clone()));
    let stats_aggregator = web::Data::new(StatsAggregator::new(task_store));

    log::info!("Starting taskvault server at {}", config.server_url());

    let server_host = config.server_host.clone();
    let server_port = config.server_port;
    HttpServer::new(move || {
        App::new()
            .app_data(identity_service.clone())
            .app_data(task_service.clone())
            .app_data(stats_aggregator.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(signer.clone()))
                    .configure(routes::config),
            )
    })
    .bind((server_host, server_port))?
    .run()
    .await
}
