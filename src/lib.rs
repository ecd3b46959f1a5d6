pub mod config;
pub mod connection;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

use connection::ConnectionCache;
use database::{Database, DatabaseInfo};

// Shared state for the whole application
pub struct AppState {
    pub connection: ConnectionCache<Database>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config) -> Arc<Self> {
        let info = DatabaseInfo::from_config(&config.database);
        Self::with_database(config, info)
    }

    pub fn with_database(config: config::Config, info: DatabaseInfo) -> Arc<Self> {
        Arc::new(Self {
            connection: ConnectionCache::from_info(info),
            config,
        })
    }

    /// Database handle through the process-wide connection cache
    pub async fn db(&self) -> error::Result<Database> {
        self.connection.get().await
    }
}
