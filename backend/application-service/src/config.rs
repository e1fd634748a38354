//! Configuration for Application Service

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Base URL of job-service, consulted for job ownership
    pub job_service_url: String,
    pub upstream_timeout_secs: u64,
    pub internal_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8083".to_string())
                .parse()
                .context("Invalid SERVER_PORT")?,
            workers: env::var("SERVER_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("Invalid SERVER_WORKERS")?,
            job_service_url: env::var("JOB_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8082".to_string()),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid UPSTREAM_TIMEOUT_SECS")?,
            internal_api_key: env::var("INTERNAL_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
