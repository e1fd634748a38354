//! Configuration management for Identity Service
//!
//! Loads settings from environment variables, with a `.env` file honoured in
//! debug builds for local development.
//!
//! # Example
//!
//! ```no_run
//! use identity_service::config::Settings;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     println!("Token TTL: {}s", settings.jwt.expiry_seconds);
//!     Ok(())
//! }
//! ```

use anyhow::{bail, Context, Result};
use crypto_core::check_signing_secret;
use std::env;
use std::fmt;
use tracing::info;

/// Application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub jwt: JwtSettings,
    /// `None` runs on the in-memory store
    pub database: Option<DatabaseSettings>,
    /// Required in `X-Internal-Api-Key` on guarded routes when set
    pub internal_api_key: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        // Load .env file in development
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
            info!("Loaded .env file for development");
        }

        Ok(Settings {
            server: ServerSettings::from_env()?,
            jwt: JwtSettings::from_env()?,
            database: DatabaseSettings::from_env()?,
            internal_api_key: env::var("INTERNAL_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8081".to_string())
                .parse()
                .context("Invalid SERVER_PORT")?,
            workers: env::var("SERVER_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("Invalid SERVER_WORKERS")?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token signing settings
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expiry_seconds: i64,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[REDACTED]")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}

impl JwtSettings {
    fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        check_signing_secret(&secret).context("JWT_SECRET refused")?;

        let expiry_seconds: i64 = env::var("JWT_EXPIRY_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Invalid JWT_EXPIRY_SECONDS")?;
        if expiry_seconds <= 0 {
            bail!("JWT_EXPIRY_SECONDS must be positive");
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: u64,
}

impl DatabaseSettings {
    fn from_env() -> Result<Option<Self>> {
        let url = match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => return Ok(None),
        };

        Ok(Some(Self {
            url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            acquire_timeout: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid DATABASE_ACQUIRE_TIMEOUT")?,
        }))
    }
}
