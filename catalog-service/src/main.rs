//! Hotel catalog service
//!
//! Owns hotels and rooms:
//! - public search, details, featured list and stay quotes
//! - admin management of hotels and rooms
//! - internal room snapshots and counters for booking-service

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

pub(crate) const SERVICE_NAME: &str = "catalog-service";
const DEFAULT_PORT: u16 = 8081;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog Service API",
        version = "0.1.0",
        description = "Hotels and rooms"
    ),
    paths(
        handlers::search_hotels,
        handlers::featured_hotels,
        handlers::list_cities,
        handlers::get_hotel,
        handlers::quote_room,
        handlers::admin_list_hotels,
        handlers::create_hotel,
        handlers::update_hotel,
        handlers::delete_hotel,
        handlers::admin_list_rooms,
        handlers::create_room,
        handlers::update_room,
        handlers::delete_room,
        handlers::health_check,
    ),
    components(schemas(
        common::models::Hotel,
        common::models::HotelDetails,
        common::models::HotelRequest,
        common::models::Coordinates,
        common::models::Room,
        common::models::RoomRequest,
        common::models::RoomListItem,
        common::models::BookingQuote,
        common::search::HotelSearchResult,
        common::search::SortKey,
        handlers::HealthResponse,
    )),
    tags(
        (name = "hotels", description = "Hotel browsing"),
        (name = "rooms", description = "Room pricing"),
        (name = "admin", description = "Catalog management (admin role)"),
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
