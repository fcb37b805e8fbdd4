//! Application state for catalog service.

use std::sync::Arc;

use common::config::AppConfig;
use common::db;
use common::errors::AppResult;
use common::middleware::SessionStore;
use sqlx::SqlitePool;

use crate::repository::CatalogRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repository: Arc<CatalogRepository>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Opens the database and prepares the tables this service reads.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let pool = db::connect(&config.database_url).await?;
        Self::with_pool(config, pool).await
    }

    pub async fn with_pool(config: AppConfig, pool: SqlitePool) -> AppResult<Self> {
        db::ensure_account_tables(&pool).await?;
        let repository = CatalogRepository::new(pool.clone()).await?;
        Ok(Self {
            sessions: SessionStore::new(pool, config.session_ttl_hours),
            repository: Arc::new(repository),
            config,
        })
    }
}
