//! Configuration for Job Service

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Required in `X-Internal-Api-Key` on guarded routes when set
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
                .unwrap_or_else(|_| "8082".to_string())
                .parse()
                .context("Invalid SERVER_PORT")?,
            workers: env::var("SERVER_WORKERS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("Invalid SERVER_WORKERS")?,
            internal_api_key: env::var("INTERNAL_API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_and_overrides() {
        env::remove_var("SERVER_PORT");
        env::remove_var("INTERNAL_API_KEY");
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8082);
        assert!(config.internal_api_key.is_none());

        env::set_var("SERVER_PORT", "9000");
        env::set_var("INTERNAL_API_KEY", "k");
        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.internal_api_key.as_deref(), Some("k"));

        env::set_var("SERVER_PORT", "not-a-port");
        assert!(Config::from_env().is_err());

        env::remove_var("SERVER_PORT");
        env::remove_var("INTERNAL_API_KEY");
    }
}
