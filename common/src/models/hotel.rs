//! Hotel models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::room::Room;

/// Geographic position of a hotel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A hotel as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Hotel {
    /// Unique hotel identifier.
    pub id: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub country: String,
    /// Nightly price.
    pub price_per_night: f64,
    /// Star classification, 1-5.
    pub stars: u8,
    /// Average guest rating; missing means "not rated yet".
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    /// Promoted on the landing page.
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Free-text amenity labels ("Free WiFi", "Swimming pool", ...).
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Image URLs; the first one is the cover.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Hotel {
    /// Rating used for display and ordering; unrated hotels count as 0.
    pub fn effective_rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

/// Request body for creating or updating a hotel (admin).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct HotelRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[validate(range(exclusive_min = 0.0, message = "Price per night must be positive"))]
    pub price_per_night: f64,
    #[validate(range(min = 1, max = 5, message = "Stars must be between 1 and 5"))]
    pub stars: u8,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl HotelRequest {
    /// Builds a new hotel. Rating and review count start empty.
    pub fn into_hotel(self, id: String, created_at: String) -> Hotel {
        Hotel {
            id,
            created_at,
            name: self.name,
            description: self.description,
            address: self.address,
            city: self.city,
            country: self.country,
            price_per_night: self.price_per_night,
            stars: self.stars,
            rating: None,
            review_count: None,
            featured: self.featured,
            coordinates: self.coordinates,
            amenities: clean_labels(self.amenities),
            images: self.images,
        }
    }

    /// Applies the editable fields to an existing hotel, keeping its id,
    /// creation time and guest rating.
    pub fn apply_to(self, hotel: Hotel) -> Hotel {
        let rating = hotel.rating;
        let review_count = hotel.review_count;
        let mut updated = self.into_hotel(hotel.id, hotel.created_at);
        updated.rating = rating;
        updated.review_count = review_count;
        updated
    }
}

/// Trims labels and drops empty ones (the admin form sends a comma list).
pub fn clean_labels(labels: Vec<String>) -> Vec<String> {
    labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

/// A hotel with its rooms, for the details page.
#[derive(Debug, Serialize, ToSchema)]
pub struct HotelDetails {
    pub hotel: Hotel,
    pub rooms: Vec<Room>,
}

/// Counts exposed to other services.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogStats {
    pub hotels: u64,
    pub rooms: u64,
}
