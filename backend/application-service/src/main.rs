/// Application Service Main Entry Point
use actix_middleware::{CorrelationIdMiddleware, Logging, TrustedIdentityMiddleware};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use application_service::{
    config::Config, http, ApplicationService, ApplicationStore, HttpJobDirectory,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "application_service=info,info".into()),
        )
        .with_target(false)
        .json()
        .init();

    info!("Starting Application Service");

    let config = Config::from_env().context("Failed to load configuration")?;
    if config.internal_api_key.is_none() {
        warn!("INTERNAL_API_KEY not set; requests are not checked for gateway origin");
    }

    let jobs = HttpJobDirectory::new(
        config.job_service_url.clone(),
        Duration::from_secs(config.upstream_timeout_secs),
        config.internal_api_key.clone(),
    )
    .context("Failed to build job-service client")?;
    info!(job_service_url = %config.job_service_url, "Job directory configured");

    let service = web::Data::new(ApplicationService::new(
        Arc::new(ApplicationStore::new()),
        Arc::new(jobs),
    ));
    let guard = TrustedIdentityMiddleware::new(http::exempt_paths(), config.internal_api_key.clone());
    let bind_address = config.bind_address();

    info!("Application Service listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
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
    .context("Application Service terminated with error")?;

    info!("Application Service shut down");
    Ok(())
}
