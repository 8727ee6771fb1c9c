//! Core dependencies (using traits for swappability)
//!
//! `CoreDeps` is the container handed to presentation callers. The data
//! source is chosen exactly once, from the explicit demo flag in `Config`,
//! when the container is built; toggling demo mode mid-session means
//! rebuilding the container (a full reload), never a live swap, so no two
//! components can observe different sources within one session.

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::store::{BaseMarketStore, FixtureMarketStore, FixtureObjectStorage, PgMarketStore};

use super::traits::BaseObjectStorage;

#[derive(Clone)]
pub struct CoreDeps {
    pub store: Arc<dyn BaseMarketStore>,
    pub storage: Arc<dyn BaseObjectStorage>,
    /// Bucket listing photos are written to.
    pub storage_bucket: String,
    pub demo_mode: bool,
}

impl CoreDeps {
    /// Build the container for the configured mode. Live mode connects the
    /// Postgres pool and uses the storage client supplied by the embedding
    /// application; demo mode keeps everything in-process.
    pub async fn init(
        config: &Config,
        live_storage: Arc<dyn BaseObjectStorage>,
    ) -> Result<Self> {
        if config.demo_mode {
            tracing::info!("Starting with the in-memory demo dataset");
            return Ok(Self::demo(config));
        }

        let pool = PgPool::connect(config.require_database_url()?).await?;
        tracing::info!("Connected to the live store");
        Ok(Self {
            store: Arc::new(PgMarketStore::new(pool)),
            storage: live_storage,
            storage_bucket: config.storage_bucket.clone(),
            demo_mode: false,
        })
    }

    /// Demo-mode container: seeded fixture data, in-process object storage.
    pub fn demo(config: &Config) -> Self {
        Self {
            store: Arc::new(FixtureMarketStore::seeded()),
            storage: Arc::new(FixtureObjectStorage::new()),
            storage_bucket: config.storage_bucket.clone(),
            demo_mode: true,
        }
    }
}
