//! Application state for booking service.

use std::sync::Arc;

use common::config::{AppConfig, ServiceUrls};
use common::db;
use common::errors::AppResult;
use common::middleware::SessionStore;
use sqlx::SqlitePool;

use crate::catalog_client::{CatalogClient, HttpCatalogClient};
use crate::repository::BookingRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service_urls: ServiceUrls,
    pub repository: Arc<BookingRepository>,
    pub catalog: Arc<dyn CatalogClient>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Opens the database and wires the HTTP catalog client.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let pool = db::connect(&config.database_url).await?;
        let service_urls = ServiceUrls::load();
        let catalog = Arc::new(HttpCatalogClient::new(
            service_urls.catalog_service.clone(),
            reqwest::Client::new(),
        ));
        Self::with_parts(config, service_urls, pool, catalog).await
    }

    pub async fn with_parts(
        config: AppConfig,
        service_urls: ServiceUrls,
        pool: SqlitePool,
        catalog: Arc<dyn CatalogClient>,
    ) -> AppResult<Self> {
        db::ensure_account_tables(&pool).await?;
        let repository = BookingRepository::new(pool.clone()).await?;
        Ok(Self {
            sessions: SessionStore::new(pool, config.session_ttl_hours),
            repository: Arc::new(repository),
            catalog,
            service_urls,
            config,
        })
    }
}
