//! Handler module

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use common::errors::AppError;
use common::middleware::{AdminUser, CurrentUser};
use common::models::{
    AdminBookingItem, AdminStats, Booking, CreateBookingRequest, UpdateBookingStatusRequest,
    UpdatePaymentStatusRequest, UserListItem,
};
use common::response::ApiResponse;

use crate::service::BookingService;
use crate::state::AppState;
use crate::SERVICE_NAME;

/// Optional free-text filter of the admin lists.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminSearchParams {
    pub q: Option<String>,
}

fn service(state: AppState) -> BookingService {
    BookingService::new(state.repository, state.catalog)
}

/// Book a room
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created", body = ApiResponse<Booking>),
        (status = 400, description = "Missing fields or invalid stay dates"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Room not found"),
        (status = 502, description = "Catalog service unavailable")
    )
)]
pub async fn create_booking(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let data = service(state).create(&user, req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// The caller's bookings
#[utoipa::path(
    get,
    path = "/api/bookings/mine",
    tag = "bookings",
    responses(
        (status = 200, description = "Bookings, newest first", body = ApiResponse<Vec<Booking>>),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn my_bookings(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let data = service(state).mine(&user).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// List bookings (admin)
#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    tag = "admin",
    params(AdminSearchParams),
    responses(
        (status = 200, description = "Bookings with guest names", body = ApiResponse<Vec<AdminBookingItem>>),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn admin_list_bookings(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<ApiResponse<Vec<AdminBookingItem>>>, AppError> {
    let data = service(state).admin_list(params.q.as_deref()).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Get a booking (admin)
#[utoipa::path(
    get,
    path = "/api/admin/bookings/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking", body = ApiResponse<Booking>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let data = service(state).get(&id).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Set a booking's status (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/bookings/{id}/status",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Updated booking", body = ApiResponse<Booking>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn update_booking_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let data = service(state).update_status(&id, req.status).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Set a booking's payment status (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/bookings/{id}/payment-status",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Updated booking", body = ApiResponse<Booking>),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn update_payment_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let data = service(state).update_payment_status(&id, req.payment_status).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    params(AdminSearchParams),
    responses(
        (status = 200, description = "Users", body = ApiResponse<Vec<UserListItem>>)
    )
)]
pub async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<ApiResponse<Vec<UserListItem>>>, AppError> {
    let data = service(state).list_users(params.q.as_deref()).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// A user's bookings (admin)
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/bookings",
    tag = "admin",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Bookings", body = ApiResponse<Vec<Booking>>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_bookings(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let data = service(state).user_bookings(&id).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Dashboard counters (admin)
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Counters", body = ApiResponse<AdminStats>),
        (status = 502, description = "Catalog service unavailable")
    )
)]
pub async fn admin_stats(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AdminStats>>, AppError> {
    let data = service(state).stats().await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        catalog_service: state.service_urls.catalog_service,
    })
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// Upstream used for room prices.
    pub catalog_service: String,
}
