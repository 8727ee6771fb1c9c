use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables.
///
/// The demo flag is resolved exactly once here; nothing else in the crate
/// reads the environment, so every component observes the same data source
/// for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Only required when `demo_mode` is off.
    pub database_url: Option<String>,
    /// When set, all reads and writes go to the in-memory fixture dataset
    /// and never touch the remote store or object storage.
    pub demo_mode: bool,
    /// Object storage bucket holding listing photos.
    pub storage_bucket: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let demo_mode = env::var("DEMO_MODE")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "on"))
            .unwrap_or(false);

        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => Some(url),
            Err(_) if demo_mode => None,
            Err(_) => {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be set unless DEMO_MODE is enabled"
                ))
            }
        };

        Ok(Self {
            database_url,
            demo_mode,
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "listing-photos".to_string()),
        })
    }

    /// The connection string, or an error when running live without one.
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set for live mode")
    }
}
