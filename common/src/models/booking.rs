//! Booking models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Lifecycle stage of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "canceled" => Ok(BookingStatus::Canceled),
            other => Err(AppError::DatabaseQuery(format!(
                "unknown booking status `{other}`"
            ))),
        }
    }
}

/// Payment state, tracked separately from the booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(AppError::DatabaseQuery(format!(
                "unknown payment status `{other}`"
            ))),
        }
    }
}

/// A stored booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: String,
    pub created_at: String,
    pub user_id: String,
    pub hotel_id: String,
    pub room_id: String,
    /// Hotel name at the time of booking.
    pub hotel_name: String,
    /// Room name at the time of booking.
    pub room_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Nightly room price times nights.
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
}

/// Booking request submitted from the hotel details page.
///
/// Every field is optional at the JSON level so a missing value surfaces as
/// a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(required(message = "Room is required"), length(min = 1, message = "Room is required"))]
    pub room_id: Option<String>,
    #[validate(required(message = "Check-in date is required"))]
    pub check_in: Option<NaiveDate>,
    #[validate(required(message = "Check-out date is required"))]
    pub check_out: Option<NaiveDate>,
    #[validate(
        required(message = "Guest count is required"),
        range(min = 1, message = "At least one guest is required")
    )]
    pub guests: Option<u32>,
    #[validate(required(message = "Name is required"), length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(required(message = "Email is required"), email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(required(message = "Phone is required"), length(min = 1, message = "Phone is required"))]
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// A booking request whose required fields are known to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSubmission {
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
}

impl CreateBookingRequest {
    /// Validates the request and unpacks the required fields.
    pub fn into_submission(self) -> AppResult<BookingSubmission> {
        self.validate()?;

        let missing = |field: &str| AppError::BadRequest(format!("{field} is required"));
        Ok(BookingSubmission {
            room_id: self.room_id.ok_or_else(|| missing("room_id"))?,
            check_in: self.check_in.ok_or_else(|| missing("check_in"))?,
            check_out: self.check_out.ok_or_else(|| missing("check_out"))?,
            guests: self.guests.ok_or_else(|| missing("guests"))?,
            name: self.name.ok_or_else(|| missing("name"))?,
            email: self.email.ok_or_else(|| missing("email"))?,
            phone: self.phone.ok_or_else(|| missing("phone"))?,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Stay dates for a price quote.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StayQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Price of a stay in a given room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookingQuote {
    pub room_id: String,
    pub nights: i64,
    pub nightly_price: f64,
    pub total_price: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// Booking row in the admin list, with the booking user's display name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminBookingItem {
    #[serde(flatten)]
    pub booking: Booking,
    pub user_full_name: String,
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_hotels: u64,
    pub total_users: u64,
    pub total_bookings: u64,
    /// Sum of `total_price` over all bookings.
    pub total_revenue: f64,
}
