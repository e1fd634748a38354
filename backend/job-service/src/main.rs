/// Job Service Main Entry Point
use actix_middleware::{CorrelationIdMiddleware, Logging, TrustedIdentityMiddleware};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use job_service::{config::Config, http, JobStore};
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "job_service=info,info".into()))
        .with_target(false)
        .json()
        .init();

    info!("Starting Job Service");

    let config = Config::from_env().context("Failed to load configuration")?;
    if config.internal_api_key.is_none() {
        warn!("INTERNAL_API_KEY not set; requests are not checked for gateway origin");
    }

    let store = web::Data::new(JobStore::new());
    let guard = TrustedIdentityMiddleware::new(http::exempt_paths(), config.internal_api_key.clone());
    let bind_address = config.bind_address();

    info!("Job Service listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(guard.clone())
            .wrap(CorrelationIdMiddleware)
            .wrap(Logging)
            .configure(http::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("Job Service terminated with error")?;

    info!("Job Service shut down");
    Ok(())
}
