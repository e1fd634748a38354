use actix_middleware::{CorrelationIdMiddleware, Logging};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use api_gateway::{
    config::Config,
    health,
    middleware::{AuthFilter, GatewayAuth},
    proxy::{self, Proxy},
    routes,
};
use chrono::Duration;
use crypto_core::TokenCodec;
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "api_gateway=info,info".into()),
        )
        .with_target(false)
        .json()
        .init();

    info!("Starting API Gateway...");

    let config = Config::from_env().context("Failed to load configuration")?;

    // TTL is irrelevant for verification; the codec only needs a positive value
    let codec = TokenCodec::new(&config.jwt.secret, Duration::seconds(1))
        .context("Failed to initialize token codec")?;

    info!(
        exempt = ?config.exempt_paths.prefixes(),
        internal_key = config.internal_api_key.is_some(),
        "Token verification enabled"
    );

    let filter = AuthFilter::new(Arc::new(codec), config.exempt_paths.clone());
    let gateway_auth = GatewayAuth::new(filter, config.internal_api_key.as_deref())
        .context("Invalid INTERNAL_API_KEY")?;

    let proxy = Proxy::new(
        routes(&config.services),
        std::time::Duration::from_secs(config.services.timeout_secs),
    )
    .context("Failed to build upstream HTTP client")?;
    let proxy = web::Data::new(proxy);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("API Gateway starting on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(proxy.clone())
            .wrap(gateway_auth.clone())
            .wrap(CorrelationIdMiddleware)
            .wrap(Logging)
            .route("/health", web::get().to(health))
            .default_service(web::to(proxy::forward))
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("API Gateway terminated with error")?;

    Ok(())
}
