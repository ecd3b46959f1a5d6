use serde::Deserialize;
use std::env;

use crate::error::{Error, Result};

// Top-level configuration container
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let uri = lookup("MONGODB_URI")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Configuration("MONGODB_URI must be set".to_string()))?;

        let port = var("PORT", "8000").parse().map_err(|_| {
            Error::Configuration("PORT must be a valid port number".to_string())
        })?;

        Ok(Config {
            app: AppConfig {
                host: var("HOST", "0.0.0.0"),
                port,
                environment: var("ENVIRONMENT", "development"),
                rust_log: var("RUST_LOG", "event_booking=debug,tower_http=debug"),
            },
            database: DatabaseConfig {
                uri,
                name: var("MONGODB_DATABASE", "events"),
            },
        })
    }
}
