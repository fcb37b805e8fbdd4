//! Handler module

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use common::errors::AppError;
use common::middleware::AdminUser;
use common::models::{
    BookingQuote, CatalogStats, Hotel, HotelDetails, HotelRequest, Room, RoomListItem,
    RoomRequest, RoomSnapshot, StayQuery,
};
use common::response::ApiResponse;
use common::search::{HotelSearchParams, HotelSearchResult};

use crate::service::CatalogService;
use crate::state::AppState;
use crate::SERVICE_NAME;

/// Optional free-text filter of the admin lists.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminSearchParams {
    pub q: Option<String>,
}

/// Search hotels
#[utoipa::path(
    get,
    path = "/api/hotels",
    tag = "hotels",
    params(HotelSearchParams),
    responses(
        (status = 200, description = "Matching hotels", body = ApiResponse<HotelSearchResult>)
    )
)]
pub async fn search_hotels(
    State(state): State<AppState>,
    Query(params): Query<HotelSearchParams>,
) -> Result<Json<ApiResponse<HotelSearchResult>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.search(params).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Featured hotels for the landing page
#[utoipa::path(
    get,
    path = "/api/hotels/featured",
    tag = "hotels",
    responses(
        (status = 200, description = "Featured hotels", body = ApiResponse<Vec<Hotel>>)
    )
)]
pub async fn featured_hotels(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Hotel>>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.featured().await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Cities that have at least one hotel
#[utoipa::path(
    get,
    path = "/api/hotels/cities",
    tag = "hotels",
    responses(
        (status = 200, description = "Distinct cities", body = ApiResponse<Vec<String>>)
    )
)]
pub async fn list_cities(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.cities().await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Hotel with its rooms
#[utoipa::path(
    get,
    path = "/api/hotels/{id}",
    tag = "hotels",
    params(
        ("id" = String, Path, description = "Hotel ID")
    ),
    responses(
        (status = 200, description = "Hotel details", body = ApiResponse<HotelDetails>),
        (status = 404, description = "Hotel not found")
    )
)]
pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<HotelDetails>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.hotel_details(&id).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Price of a stay in a room
#[utoipa::path(
    get,
    path = "/api/rooms/{id}/quote",
    tag = "rooms",
    params(
        ("id" = String, Path, description = "Room ID"),
        ("check_in" = String, Query, description = "Check-in date (YYYY-MM-DD)"),
        ("check_out" = String, Query, description = "Check-out date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Stay quote", body = ApiResponse<BookingQuote>),
        (status = 400, description = "Check-out is not after check-in"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn quote_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(stay): Query<StayQuery>,
) -> Result<Json<ApiResponse<BookingQuote>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.quote(&id, stay).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// List hotels (admin)
#[utoipa::path(
    get,
    path = "/api/admin/hotels",
    tag = "admin",
    params(AdminSearchParams),
    responses(
        (status = 200, description = "Hotels", body = ApiResponse<Vec<Hotel>>),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn admin_list_hotels(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<ApiResponse<Vec<Hotel>>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.admin_list_hotels(params.q.as_deref()).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Create a hotel (admin)
#[utoipa::path(
    post,
    path = "/api/admin/hotels",
    tag = "admin",
    request_body = HotelRequest,
    responses(
        (status = 200, description = "Hotel created", body = ApiResponse<Hotel>),
        (status = 400, description = "Invalid hotel")
    )
)]
pub async fn create_hotel(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<HotelRequest>,
) -> Result<Json<ApiResponse<Hotel>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.create_hotel(req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Update a hotel (admin)
#[utoipa::path(
    put,
    path = "/api/admin/hotels/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Hotel ID")
    ),
    request_body = HotelRequest,
    responses(
        (status = 200, description = "Hotel updated", body = ApiResponse<Hotel>),
        (status = 404, description = "Hotel not found")
    )
)]
pub async fn update_hotel(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<HotelRequest>,
) -> Result<Json<ApiResponse<Hotel>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.update_hotel(&id, req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Delete a hotel and its rooms (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/hotels/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Hotel ID")
    ),
    responses(
        (status = 200, description = "Hotel deleted", body = ApiResponse<bool>),
        (status = 404, description = "Hotel not found")
    )
)]
pub async fn delete_hotel(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    let service = CatalogService::new(state.repository);
    service.delete_hotel(&id).await?;
    Ok(Json(ApiResponse::ok_with_service(true, SERVICE_NAME)))
}

/// List rooms with hotel names (admin)
#[utoipa::path(
    get,
    path = "/api/admin/rooms",
    tag = "admin",
    params(AdminSearchParams),
    responses(
        (status = 200, description = "Rooms", body = ApiResponse<Vec<RoomListItem>>)
    )
)]
pub async fn admin_list_rooms(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(params): Query<AdminSearchParams>,
) -> Result<Json<ApiResponse<Vec<RoomListItem>>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.admin_list_rooms(params.q.as_deref()).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Create a room (admin)
#[utoipa::path(
    post,
    path = "/api/admin/rooms",
    tag = "admin",
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Room created", body = ApiResponse<Room>),
        (status = 400, description = "Invalid room"),
        (status = 404, description = "Hotel not found")
    )
)]
pub async fn create_room(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<RoomRequest>,
) -> Result<Json<ApiResponse<Room>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.create_room(req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Update a room (admin)
#[utoipa::path(
    put,
    path = "/api/admin/rooms/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Room ID")
    ),
    request_body = RoomRequest,
    responses(
        (status = 200, description = "Room updated", body = ApiResponse<Room>),
        (status = 404, description = "Room or hotel not found")
    )
)]
pub async fn update_room(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RoomRequest>,
) -> Result<Json<ApiResponse<Room>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.update_room(&id, req).await?;
    Ok(Json(ApiResponse::ok_with_service(data, SERVICE_NAME)))
}

/// Delete a room (admin)
#[utoipa::path(
    delete,
    path = "/api/admin/rooms/{id}",
    tag = "admin",
    params(
        ("id" = String, Path, description = "Room ID")
    ),
    responses(
        (status = 200, description = "Room deleted", body = ApiResponse<bool>),
        (status = 404, description = "Room not found")
    )
)]
pub async fn delete_room(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    let service = CatalogService::new(state.repository);
    service.delete_room(&id).await?;
    Ok(Json(ApiResponse::ok_with_service(true, SERVICE_NAME)))
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
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Internal endpoint: room price and labels for booking-service.
pub async fn room_snapshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RoomSnapshot>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.room_snapshot(&id).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Internal endpoint: catalog counters for the admin dashboard.
pub async fn catalog_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CatalogStats>>, AppError> {
    let service = CatalogService::new(state.repository);
    let data = service.stats().await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
