//! Gateway health endpoints.

use std::time::Instant;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::proxy::Upstream;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/health/all", get(aggregated_health))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Down,
}

/// Liveness of the gateway itself.
#[derive(Serialize, ToSchema)]
pub struct GatewayHealth {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub checked_at: DateTime<Utc>,
}

/// The gateway plus every service it forwards to.
#[derive(Serialize, ToSchema)]
pub struct HealthReport {
    /// `healthy` only when every upstream answered.
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    pub services: Vec<UpstreamHealth>,
}

#[derive(Serialize, ToSchema)]
pub struct UpstreamHealth {
    pub name: String,
    pub url: String,
    pub status: HealthStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Gateway is running", body = GatewayHealth)
    )
)]
pub async fn health_check() -> Json<GatewayHealth> {
    Json(GatewayHealth {
        status: HealthStatus::Healthy,
        service: crate::SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checked_at: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/api/health/all",
    tag = "health",
    responses(
        (status = 200, description = "Health of every upstream", body = HealthReport)
    )
)]
pub async fn aggregated_health(State(state): State<AppState>) -> Json<HealthReport> {
    let [catalog, booking] = Upstream::ALL;
    let (catalog, booking) = tokio::join!(
        check_upstream(&state, catalog),
        check_upstream(&state, booking),
    );
    let services = vec![catalog, booking];

    let status = if services.iter().all(|s| s.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthReport {
        status,
        checked_at: Utc::now(),
        services,
    })
}

async fn check_upstream(state: &AppState, upstream: Upstream) -> UpstreamHealth {
    let url = upstream.base_url(&state.service_urls).to_string();
    let started = Instant::now();
    let result = state.http_client.get(format!("{url}/api/health")).send().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let error = match result {
        Ok(response) if response.status().is_success() => None,
        Ok(response) => Some(format!("HTTP {}", response.status())),
        Err(e) => Some(e.to_string()),
    };
    if let Some(error) = &error {
        tracing::warn!(upstream = upstream.name(), %error, "upstream health check failed");
    }

    UpstreamHealth {
        name: upstream.name().to_string(),
        url,
        status: if error.is_none() { HealthStatus::Healthy } else { HealthStatus::Down },
        latency_ms,
        error,
    }
}
