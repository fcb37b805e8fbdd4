//! API gateway
//!
//! Single entry point for clients:
//! - forwards `/api/...` requests to the owning service by path prefix
//! - reports its own health and the health of every service behind it

mod proxy;
mod routes;
mod state;

use axum::{middleware, routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig, ServiceUrls};
use common::logging::init_tracing;
use common::middleware::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

pub(crate) const SERVICE_NAME: &str = "gateway";
const DEFAULT_PORT: u16 = 8080;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hotel Booking API",
        version = "0.1.0",
        description = "API gateway for the hotel booking services"
    ),
    paths(
        routes::health_check,
        routes::aggregated_health,
    ),
    components(schemas(
        routes::HealthStatus,
        routes::GatewayHealth,
        routes::HealthReport,
        routes::UpstreamHealth,
    )),
    tags(
        (name = "health", description = "Health check")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = AppConfig::load_with_service(SERVICE_NAME, DEFAULT_PORT);
    init_tracing(config.log_format);

    let service_urls = ServiceUrls::load();
    info!(
        catalog_service = %service_urls.catalog_service,
        booking_service = %service_urls.booking_service,
        "upstream services"
    );

    let state = AppState::new(config.clone(), service_urls)?;
    let app = create_router(state);

    let addr = config.bind_addr();
    info!(service = SERVICE_NAME, address = %addr, "starting API gateway");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .merge(proxy::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::Request;
    use axum::http::StatusCode;
    use common::config::LogFormat;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn config() -> AppConfig {
        AppConfig {
            service_name: SERVICE_NAME.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            session_ttl_hours: 1,
            log_format: LogFormat::Pretty,
        }
    }

    fn header(req: &Request, key: &str) -> Option<String> {
        req.headers()
            .get(key)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Upstream that echoes what it received.
    async fn spawn_echo(name: &'static str) -> String {
        let app = Router::new().fallback(move |req: Request| async move {
            let mut echo = json!({
                "upstream": name,
                "method": req.method().as_str(),
                "uri": req.uri().to_string(),
                "authorization": header(&req, "authorization"),
                "request_id": header(&req, "x-request-id"),
            });
            let body = to_bytes(req.into_body(), usize::MAX).await.unwrap();
            echo["body"] = json!(String::from_utf8_lossy(&body));
            (StatusCode::CREATED, Json(echo))
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn send(router: Router, req: Request) -> (StatusCode, Value) {
        let res = router.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn forwards_by_prefix_with_method_query_body_and_headers() {
        let urls = ServiceUrls {
            catalog_service: spawn_echo("catalog").await,
            booking_service: spawn_echo("booking").await,
        };
        let router = create_router(AppState::new(config(), urls).unwrap());

        let req = Request::builder()
            .method("GET")
            .uri("/api/hotels?city=Aden&sort=price_desc")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router.clone(), req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["upstream"], "catalog");
        assert_eq!(body["uri"], "/api/hotels?city=Aden&sort=price_desc");

        let req = Request::builder()
            .method("PATCH")
            .uri("/api/admin/bookings/b1/status")
            .header("Authorization", "Bearer secret")
            .header("x-request-id", "req-42")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"status":"paid"}"#))
            .unwrap();
        let (_, body) = send(router, req).await;
        assert_eq!(body["upstream"], "booking");
        assert_eq!(body["method"], "PATCH");
        assert_eq!(body["authorization"], "Bearer secret");
        assert_eq!(body["request_id"], "req-42");
        assert_eq!(body["body"], r#"{"status":"paid"}"#);
    }

    #[tokio::test]
    async fn aggregated_health_is_healthy_when_every_upstream_answers() {
        let urls = ServiceUrls {
            catalog_service: spawn_echo("catalog").await,
            booking_service: spawn_echo("booking").await,
        };
        let router = create_router(AppState::new(config(), urls).unwrap());

        let req = Request::builder().uri("/api/health/all").body(Body::empty()).unwrap();
        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        let names: Vec<&str> = body["services"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["catalog-service", "booking-service"]);
        assert!(body["services"][0].get("error").is_none());
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let urls = ServiceUrls {
            catalog_service: "http://127.0.0.1:9".to_string(),
            booking_service: "http://127.0.0.1:9".to_string(),
        };
        let router = create_router(AppState::new(config(), urls).unwrap());

        let req = Request::builder().uri("/api/payments").body(Body::empty()).unwrap();
        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_bad_gateway_and_degrades_health() {
        let urls = ServiceUrls {
            catalog_service: "http://127.0.0.1:9".to_string(),
            booking_service: "http://127.0.0.1:9".to_string(),
        };
        let router = create_router(AppState::new(config(), urls).unwrap());

        let req = Request::builder().uri("/api/hotels").body(Body::empty()).unwrap();
        let (status, body) = send(router.clone(), req).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE_ERROR");

        let req = Request::builder().uri("/api/health/all").body(Body::empty()).unwrap();
        let (_, body) = send(router.clone(), req).await;
        assert_eq!(body["status"], "degraded");
        let services = body["services"].as_array().unwrap();
        assert_eq!(services.len(), 2);
        assert!(services.iter().all(|s| s["status"] == "down" && s["error"].is_string()));

        let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
