//! Unique ID generator.

use uuid::Uuid;

/// Generates identifiers for stored entities.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates a unique entity ID (hotel, room, booking).
    ///
    /// # Returns
    /// A unique UUID string.
    pub fn entity_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Short human-facing booking reference: the first 8 characters of the
    /// booking id, upper-cased.
    pub fn booking_reference(booking_id: &str) -> String {
        booking_id.chars().take(8).collect::<String>().to_uppercase()
    }
}
