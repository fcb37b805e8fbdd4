//! Application error type shared by all services.
//!
//! Every handler returns `Result<_, AppError>`; the [`IntoResponse`] impl turns
//! the error into the standard [`ApiResponse`] error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// Result alias used throughout the services.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed field validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    /// Check-out is not strictly after check-in.
    #[error("checkout must be after checkin")]
    InvalidStayDates,

    #[error("authentication required")]
    Unauthorized,

    #[error("admin role required")]
    Forbidden,

    #[error("hotel not found: {0}")]
    HotelNotFound(String),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("no route for {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    DatabaseQuery(String),

    #[error("external service error: {0}")]
    ExternalService(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code placed in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidStayDates => "INVALID_STAY_DATES",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::HotelNotFound(_) => "HOTEL_NOT_FOUND",
            AppError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            AppError::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            AppError::UserNotFound(_) => "USER_NOT_FOUND",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::DatabaseQuery(_) => "DATABASE_ERROR",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::InvalidStayDates => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::HotelNotFound(_)
            | AppError::RoomNotFound(_)
            | AppError::BookingNotFound(_)
            | AppError::UserNotFound(_)
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseQuery(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseQuery(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }

        let body = match &self {
            AppError::Validation(errors) => match serde_json::to_value(errors) {
                Ok(details) => {
                    ApiResponse::err_with_details(self.code(), self.to_string(), details)
                }
                Err(_) => ApiResponse::err(self.code(), self.to_string()),
            },
            _ => ApiResponse::err(self.code(), self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
