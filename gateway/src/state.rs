//! Application state for gateway service.

use std::time::Duration;

use common::config::{AppConfig, ServiceUrls};
use common::errors::{AppError, AppResult};

/// Upstream requests that take longer than this fail with 502.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub service_urls: ServiceUrls,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig, service_urls: ServiceUrls) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            service_urls,
            http_client,
        })
    }
}
