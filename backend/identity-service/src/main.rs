/// Identity Service Main Entry Point
///
/// Starts the HTTP server with:
/// - Token codec (HS256, shared secret)
/// - PostgreSQL user store, or the in-memory store when DATABASE_URL is unset
/// - Trusted identity guard on non-public routes
use actix_middleware::{CorrelationIdMiddleware, Logging, TrustedIdentityMiddleware};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use chrono::Duration;
use crypto_core::TokenCodec;
use identity_service::{
    config::Settings,
    db::{InMemoryUserRepository, PgUserRepository, UserRepository},
    http, IdentityService,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "identity_service=info,info".into()),
        )
        .with_target(false)
        .json()
        .init();

    info!("Starting Identity Service");

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    let codec = TokenCodec::new(
        &settings.jwt.secret,
        Duration::seconds(settings.jwt.expiry_seconds),
    )
    .context("Failed to initialize token codec")?;
    info!(ttl_seconds = settings.jwt.expiry_seconds, "Token codec initialized");

    let users: Arc<dyn UserRepository> = match &settings.database {
        Some(database) => {
            let db_pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(database.acquire_timeout))
                .connect(&database.url)
                .await
                .context("Failed to connect to PostgreSQL")?;

            info!(
                "Database pool initialized with {} max connections",
                database.max_connections
            );

            // Run database migrations
            sqlx::migrate!("./migrations")
                .run(&db_pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Database migrations completed");

            Arc::new(PgUserRepository::new(db_pool))
        }
        None => {
            info!("DATABASE_URL not set; using in-memory user store");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let service = web::Data::new(IdentityService::new(users, Arc::new(codec)));
    let guard = TrustedIdentityMiddleware::new(http::exempt_paths(), settings.internal_api_key.clone());
    let bind_address = settings.server.bind_address();

    info!("Identity Service listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(guard.clone())
            .wrap(CorrelationIdMiddleware)
            .wrap(Logging)
            .configure(http::configure)
    })
    .workers(settings.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("Identity Service terminated with error")?;

    info!("Identity Service shut down");
    Ok(())
}
