//! Catalog service routes

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Public, admin and internal routes of the catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/hotels", get(handlers::search_hotels))
        .route("/api/hotels/featured", get(handlers::featured_hotels))
        .route("/api/hotels/cities", get(handlers::list_cities))
        .route("/api/hotels/{id}", get(handlers::get_hotel))
        .route("/api/rooms/{id}/quote", get(handlers::quote_room))
        .route(
            "/api/admin/hotels",
            get(handlers::admin_list_hotels).post(handlers::create_hotel),
        )
        .route(
            "/api/admin/hotels/{id}",
            put(handlers::update_hotel).delete(handlers::delete_hotel),
        )
        .route(
            "/api/admin/rooms",
            get(handlers::admin_list_rooms).post(handlers::create_room),
        )
        .route(
            "/api/admin/rooms/{id}",
            put(handlers::update_room).delete(handlers::delete_room),
        )
        .route("/api/health", get(handlers::health_check))
        .route("/internal/rooms/{id}", get(handlers::room_snapshot))
        .route("/internal/stats", get(handlers::catalog_stats))
}
