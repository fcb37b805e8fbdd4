//! Booking service
//!
//! Turns a room and stay dates into a stored reservation, and backs the
//! admin dashboard:
//! - booking submission and "my bookings"
//! - admin booking, payment and user management
//! - dashboard counters (hotel count comes from catalog-service)

mod catalog_client;
mod handlers;
mod repository;
mod routes;
mod service;
mod state;

use axum::{middleware, routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::logging::init_tracing;
use common::middleware::{auth_middleware, request_id_middleware};
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

pub(crate) const SERVICE_NAME: &str = "booking-service";
const DEFAULT_PORT: u16 = 8082;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Booking Service API",
        version = "0.1.0",
        description = "Reservations, users and dashboard counters"
    ),
    paths(
        handlers::create_booking,
        handlers::my_bookings,
        handlers::admin_list_bookings,
        handlers::get_booking,
        handlers::update_booking_status,
        handlers::update_payment_status,
        handlers::list_users,
        handlers::user_bookings,
        handlers::admin_stats,
        handlers::health_check,
    ),
    components(schemas(
        common::models::Booking,
        common::models::BookingStatus,
        common::models::PaymentStatus,
        common::models::CreateBookingRequest,
        common::models::UpdateBookingStatusRequest,
        common::models::UpdatePaymentStatusRequest,
        common::models::AdminBookingItem,
        common::models::AdminStats,
        common::models::Profile,
        common::models::UserListItem,
        handlers::HealthResponse,
    )),
    tags(
        (name = "bookings", description = "Guest bookings"),
        (name = "admin", description = "Booking and user management (admin role)"),
        (name = "health", description = "Health check")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = AppConfig::load_with_service(SERVICE_NAME, DEFAULT_PORT);
    init_tracing(config.log_format);

    let state = AppState::new(config.clone()).await?;
    info!(catalog_service = %state.service_urls.catalog_service, "catalog upstream");
    let app = create_router(state);

    let addr = config.bind_addr();
    info!(service = SERVICE_NAME, address = %addr, "starting service");

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
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn_with_state(state.sessions.clone(), auth_middleware))
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
    use crate::catalog_client::tests::StubCatalog;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use common::config::{LogFormat, ServiceUrls};
    use common::db::{connect, upsert_profile};
    use common::models::Profile;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        admin_token: String,
        guest_token: String,
    }

    async fn test_app(catalog: StubCatalog) -> TestApp {
        let config = AppConfig {
            service_name: SERVICE_NAME.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            session_ttl_hours: 1,
            log_format: LogFormat::Pretty,
        };
        let urls = ServiceUrls {
            catalog_service: "http://catalog.test".to_string(),
            booking_service: "http://booking.test".to_string(),
        };
        let pool = connect(&config.database_url).await.unwrap();
        let state = AppState::with_parts(config, urls, pool.clone(), Arc::new(catalog))
            .await
            .unwrap();

        for (id, first, is_admin) in [("admin", "Nadia", true), ("guest", "Amal", false)] {
            upsert_profile(
                &pool,
                &Profile {
                    id: id.to_string(),
                    created_at: "2024-01-01T00:00:00Z".to_string(),
                    email: format!("{id}@example.com"),
                    first_name: Some(first.to_string()),
                    last_name: Some("Saleh".to_string()),
                    avatar_url: None,
                    is_admin,
                },
            )
            .await
            .unwrap();
        }
        let admin_token = state.sessions.issue("admin").await.unwrap();
        let guest_token = state.sessions.issue("guest").await.unwrap();

        TestApp {
            router: create_router(state),
            admin_token,
            guest_token,
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn booking_body() -> Value {
        json!({
            "room_id": "r1",
            "check_in": "2024-01-01",
            "check_out": "2024-01-04",
            "guests": 2,
            "name": "Amal Saleh",
            "email": "amal@example.com",
            "phone": "+967 1 234 567",
            // clients cannot pick the initial status
            "status": "confirmed"
        })
    }

    #[tokio::test]
    async fn guest_books_a_room_and_sees_it() {
        let app = test_app(StubCatalog::with_room("r1", 100.0)).await;

        let (status, body) = send(&app, request("POST", "/api/bookings", Some(&app.guest_token), Some(booking_body()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_price"], 300.0);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["payment_status"], "unpaid");
        assert_eq!(body["data"]["user_id"], "guest");

        let (_, body) = send(&app, request("GET", "/api/bookings/mine", Some(&app.guest_token), None)).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = send(&app, request("GET", "/api/bookings/mine", Some(&app.admin_token), None)).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn booking_requires_a_session() {
        let app = test_app(StubCatalog::with_room("r1", 100.0)).await;
        let (status, body) = send(&app, request("POST", "/api/bookings", None, Some(booking_body()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn booking_errors_map_to_codes() {
        let app = test_app(StubCatalog::with_room("r1", 100.0)).await;

        let mut missing_phone = booking_body();
        missing_phone.as_object_mut().unwrap().remove("phone");
        let (status, body) = send(&app, request("POST", "/api/bookings", Some(&app.guest_token), Some(missing_phone))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["details"]["phone"].is_array());

        let mut reversed = booking_body();
        reversed["check_in"] = json!("2024-01-04");
        reversed["check_out"] = json!("2024-01-01");
        let (status, body) = send(&app, request("POST", "/api/bookings", Some(&app.guest_token), Some(reversed))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_STAY_DATES");

        let mut unknown_room = booking_body();
        unknown_room["room_id"] = json!("r404");
        let (status, body) = send(&app, request("POST", "/api/bookings", Some(&app.guest_token), Some(unknown_room))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "ROOM_NOT_FOUND");
    }

    #[tokio::test]
    async fn catalog_outage_is_bad_gateway() {
        let catalog = StubCatalog { unreachable: true, ..StubCatalog::with_room("r1", 100.0) };
        let app = test_app(catalog).await;
        let (status, body) = send(&app, request("POST", "/api/bookings", Some(&app.guest_token), Some(booking_body()))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "EXTERNAL_SERVICE_ERROR");
    }

    #[tokio::test]
    async fn admin_manages_bookings_and_reads_stats() {
        let app = test_app(StubCatalog::with_room("r1", 100.0)).await;
        let (_, created) = send(&app, request("POST", "/api/bookings", Some(&app.guest_token), Some(booking_body()))).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, request("GET", "/api/admin/bookings", Some(&app.guest_token), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, list) = send(&app, request("GET", "/api/admin/bookings?q=amal", Some(&app.admin_token), None)).await;
        assert_eq!(list["data"][0]["user_full_name"], "Amal Saleh");
        assert_eq!(list["data"][0]["id"], id.as_str());

        let uri = format!("/api/admin/bookings/{id}/status");
        let (status, updated) = send(&app, request("PATCH", &uri, Some(&app.admin_token), Some(json!({"status": "confirmed"})))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["status"], "confirmed");

        let uri = format!("/api/admin/bookings/{id}/payment-status");
        let (_, updated) = send(&app, request("PATCH", &uri, Some(&app.admin_token), Some(json!({"payment_status": "paid"})))).await;
        assert_eq!(updated["data"]["payment_status"], "paid");

        let (status, _) = send(&app, request("PATCH", &uri, Some(&app.admin_token), Some(json!({"payment_status": "stolen"})))).await;
        assert!(status.is_client_error());

        let (status, body) = send(&app, request("GET", "/api/admin/bookings/nope", Some(&app.admin_token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "BOOKING_NOT_FOUND");

        let (_, stats) = send(&app, request("GET", "/api/admin/stats", Some(&app.admin_token), None)).await;
        assert_eq!(stats["data"]["total_hotels"], 3);
        assert_eq!(stats["data"]["total_users"], 2);
        assert_eq!(stats["data"]["total_bookings"], 1);
        assert_eq!(stats["data"]["total_revenue"], 300.0);
    }

    #[tokio::test]
    async fn admin_lists_users_and_their_bookings() {
        let app = test_app(StubCatalog::with_room("r1", 100.0)).await;
        send(&app, request("POST", "/api/bookings", Some(&app.guest_token), Some(booking_body()))).await;

        let (_, users) = send(&app, request("GET", "/api/admin/users?q=nadia", Some(&app.admin_token), None)).await;
        assert_eq!(users["data"].as_array().unwrap().len(), 1);
        assert_eq!(users["data"][0]["full_name"], "Nadia Saleh");

        let (_, bookings) = send(&app, request("GET", "/api/admin/users/guest/bookings", Some(&app.admin_token), None)).await;
        assert_eq!(bookings["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, request("GET", "/api/admin/users/ghost/bookings", Some(&app.admin_token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app(StubCatalog::default()).await;
        let (status, body) = send(&app, request("GET", "/api/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], SERVICE_NAME);
    }
}
