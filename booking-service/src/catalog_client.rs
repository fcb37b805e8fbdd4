//! Client for the catalog service's internal endpoints.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use common::errors::{AppError, AppResult};
use common::models::{CatalogStats, RoomSnapshot};

/// What booking-service needs to know about the catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Current price and labels of a room. Unknown rooms are `RoomNotFound`.
    async fn room_snapshot(&self, room_id: &str) -> AppResult<RoomSnapshot>;

    async fn stats(&self) -> AppResult<CatalogStats>;
}

/// The `data` part of the catalog's response envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// [`CatalogClient`] talking to catalog-service over HTTP.
pub struct HttpCatalogClient {
    catalog_service_url: String,
    http_client: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(catalog_service_url: String, http_client: reqwest::Client) -> Self {
        Self {
            catalog_service_url: catalog_service_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<Option<T>> {
        let url = format!("{}{}", self.catalog_service_url, path);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("catalog service unreachable: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "catalog service returned {} for {path}",
                response.status()
            )));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("invalid catalog response: {e}")))?;

        envelope.data.map(Some).ok_or_else(|| {
            AppError::ExternalService(format!("catalog response for {path} has no data"))
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn room_snapshot(&self, room_id: &str) -> AppResult<RoomSnapshot> {
        self.get(&format!("/internal/rooms/{room_id}"))
            .await?
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))
    }

    async fn stats(&self) -> AppResult<CatalogStats> {
        self.get("/internal/stats").await?.ok_or_else(|| {
            AppError::ExternalService("catalog stats endpoint not found".to_string())
        })
    }
}
