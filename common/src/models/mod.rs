//! Shared data models for all services.

pub mod booking;
pub mod hotel;
pub mod profile;
pub mod room;

// Re-export commonly used types
pub use booking::{
    AdminBookingItem, AdminStats, Booking, BookingQuote, BookingStatus, BookingSubmission,
    CreateBookingRequest, PaymentStatus, StayQuery, UpdateBookingStatusRequest,
    UpdatePaymentStatusRequest,
};
pub use hotel::{CatalogStats, Coordinates, Hotel, HotelDetails, HotelRequest};
pub use profile::{Profile, UserListItem};
pub use room::{Room, RoomListItem, RoomRequest, RoomSnapshot};
