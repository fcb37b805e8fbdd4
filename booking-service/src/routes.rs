//! Booking service routes

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(handlers::create_booking))
        .route("/api/bookings/mine", get(handlers::my_bookings))
        .route("/api/admin/bookings", get(handlers::admin_list_bookings))
        .route("/api/admin/bookings/{id}", get(handlers::get_booking))
        .route(
            "/api/admin/bookings/{id}/status",
            patch(handlers::update_booking_status),
        )
        .route(
            "/api/admin/bookings/{id}/payment-status",
            patch(handlers::update_payment_status),
        )
        .route("/api/admin/users", get(handlers::list_users))
        .route("/api/admin/users/{id}/bookings", get(handlers::user_bookings))
        .route("/api/admin/stats", get(handlers::admin_stats))
        .route("/api/health", get(handlers::health_check))
}
