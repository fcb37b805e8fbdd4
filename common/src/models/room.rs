//! Room models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::hotel::clean_labels;

/// A bookable room type belonging to a hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub id: String,
    pub created_at: String,
    pub hotel_id: String,
    pub name: String,
    pub description: String,
    pub price_per_night: f64,
    /// Maximum number of guests.
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Request body for creating or updating a room (admin).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RoomRequest {
    #[validate(length(min = 1, message = "Hotel is required"))]
    pub hotel_id: String,
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "Price per night must be positive"))]
    pub price_per_night: f64,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl RoomRequest {
    pub fn into_room(self, id: String, created_at: String) -> Room {
        Room {
            id,
            created_at,
            hotel_id: self.hotel_id,
            name: self.name,
            description: self.description,
            price_per_night: self.price_per_night,
            capacity: self.capacity,
            amenities: clean_labels(self.amenities),
            images: self.images,
        }
    }
}

/// Room row in the admin list, labelled with its hotel.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomListItem {
    #[serde(flatten)]
    pub room: Room,
    /// Missing when the hotel row is gone.
    pub hotel_name: Option<String>,
}

/// What the booking service needs to know about a room to price a stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub room_name: String,
    pub hotel_id: String,
    pub hotel_name: String,
    pub price_per_night: f64,
    pub capacity: u32,
}
