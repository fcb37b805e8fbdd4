//! Request forwarding to the owning service.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Router,
};

use common::config::ServiceUrls;
use common::errors::{AppError, AppResult};
use common::middleware::{RequestId, REQUEST_ID_HEADER};

use crate::state::AppState;

/// Largest request body the gateway will forward.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Services behind the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Catalog,
    Booking,
}

impl Upstream {
    pub const ALL: [Upstream; 2] = [Upstream::Catalog, Upstream::Booking];

    pub fn name(self) -> &'static str {
        match self {
            Upstream::Catalog => "catalog-service",
            Upstream::Booking => "booking-service",
        }
    }

    /// Base URL of the service, without a trailing slash.
    pub fn base_url(self, urls: &ServiceUrls) -> &str {
        let url = match self {
            Upstream::Catalog => &urls.catalog_service,
            Upstream::Booking => &urls.booking_service,
        };
        url.trim_end_matches('/')
    }
}

const ROUTES: &[(&str, Upstream)] = &[
    ("/api/hotels", Upstream::Catalog),
    ("/api/rooms", Upstream::Catalog),
    ("/api/admin/hotels", Upstream::Catalog),
    ("/api/admin/rooms", Upstream::Catalog),
    ("/api/bookings", Upstream::Booking),
    ("/api/admin/bookings", Upstream::Booking),
    ("/api/admin/users", Upstream::Booking),
    ("/api/admin/stats", Upstream::Booking),
];

/// Finds the service owning `path`. A prefix matches itself and anything below it.
pub fn upstream_for(path: &str) -> Option<Upstream> {
    ROUTES.iter().find_map(|(prefix, upstream)| {
        let rest = path.strip_prefix(prefix)?;
        (rest.is_empty() || rest.starts_with('/')).then_some(*upstream)
    })
}

/// Headers copied onto the upstream request.
const FORWARDED_HEADERS: [HeaderName; 2] = [header::AUTHORIZATION, header::CONTENT_TYPE];

pub fn router() -> Router<AppState> {
    Router::new().fallback(forward)
}

async fn forward(State(state): State<AppState>, req: Request) -> Response {
    match forward_request(&state, req).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn forward_request(state: &AppState, req: Request) -> AppResult<Response> {
    let path = req.uri().path().to_string();
    let upstream = upstream_for(&path).ok_or_else(|| AppError::NotFound(path.clone()))?;

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(path.as_str());
    let url = format!("{}{}", upstream.base_url(&state.service_urls), path_and_query);

    let method = req.method().clone();
    let headers = forwarded_headers(&req);
    let body = to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {e}")))?;

    tracing::debug!(upstream = upstream.name(), %method, url = %url, "forwarding request");

    let upstream_response = state
        .http_client
        .request(method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| AppError::ExternalService(format!("{} unreachable: {e}", upstream.name())))?;

    let status = upstream_response.status();
    let content_type = upstream_response.headers().get(header::CONTENT_TYPE).cloned();
    let bytes = upstream_response
        .bytes()
        .await
        .map_err(|e| {
            AppError::ExternalService(format!("{} response failed: {e}", upstream.name()))
        })?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}

/// Authorization, Content-Type and the request id of the incoming request.
fn forwarded_headers(req: &Request) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in &FORWARDED_HEADERS {
        if let Some(value) = req.headers().get(name) {
            headers.insert(name.clone(), value.clone());
        }
    }
    if let Some(id) = req.extensions().get::<RequestId>() {
        if let Ok(value) = HeaderValue::from_str(id.as_str()) {
            headers.insert(REQUEST_ID_HEADER.clone(), value);
        }
    }
    headers
}
