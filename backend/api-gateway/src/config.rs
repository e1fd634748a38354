//! Configuration for API Gateway
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)

use actix_middleware::ExemptPaths;
use anyhow::{Context, Result};
use crypto_core::check_signing_secret;
use std::env;
use std::fmt;

pub const DEFAULT_EXEMPT_PATHS: &str = "/identity/login,/identity/register,/health,/docs";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Upstream service endpoints
    pub services: ServiceEndpoints,

    /// Token verification
    pub jwt: JwtConfig,

    /// Path prefixes reachable without a token
    pub exempt_paths: ExemptPaths,

    /// Attached as `X-Internal-Api-Key` to every forwarded request when set
    pub internal_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub identity_service: String,
    pub job_service: String,
    pub application_service: String,
    pub timeout_secs: u64,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("Invalid SERVER_PORT")?,
                workers: env::var("SERVER_WORKERS")
                    .unwrap_or_else(|_| "4".to_string())
                    .parse()
                    .context("Invalid SERVER_WORKERS")?,
            },
            services: ServiceEndpoints {
                identity_service: env::var("IDENTITY_SERVICE_URL")
                    .unwrap_or_else(|_| "http://identity-service:8081".to_string()),
                job_service: env::var("JOB_SERVICE_URL")
                    .unwrap_or_else(|_| "http://job-service:8082".to_string()),
                application_service: env::var("APPLICATION_SERVICE_URL")
                    .unwrap_or_else(|_| "http://application-service:8083".to_string()),
                timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("Invalid UPSTREAM_TIMEOUT_SECS")?,
            },
            jwt: Self::load_jwt_config()?,
            exempt_paths: ExemptPaths::from_csv(
                &env::var("GATEWAY_EXEMPT_PATHS").unwrap_or_else(|_| DEFAULT_EXEMPT_PATHS.to_string()),
            ),
            internal_api_key: env::var("INTERNAL_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }

    fn load_jwt_config() -> Result<JwtConfig> {
        let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        check_signing_secret(&secret).context("JWT_SECRET refused")?;

        Ok(JwtConfig { secret })
    }
}
