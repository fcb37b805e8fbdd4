//! Catalog service module.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use common::errors::{AppError, AppResult};
use common::models::{
    BookingQuote, CatalogStats, Hotel, HotelDetails, HotelRequest, Room, RoomListItem,
    RoomRequest, RoomSnapshot, StayQuery,
};
use common::pricing::compute_booking_total;
use common::search::{distinct_cities, filter_and_sort_hotels, HotelSearchParams, HotelSearchResult};
use common::utils::{matches_any, IdGenerator};

use crate::repository::CatalogRepository;

/// Number of hotels shown on the landing page.
pub const FEATURED_LIMIT: u32 = 4;

/// Hotel and room operations.
pub struct CatalogService {
    repository: Arc<CatalogRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<CatalogRepository>) -> Self {
        Self { repository }
    }

    /// Runs the filter/sort pipeline over every stored hotel.
    pub async fn search(&self, params: HotelSearchParams) -> AppResult<HotelSearchResult> {
        let hotels = self.repository.list_hotels().await?;
        let (filters, sort) = params.into_filters();

        let items = filter_and_sort_hotels(&hotels, &filters, sort);
        tracing::debug!(
            matched = items.len(),
            of = hotels.len(),
            sort = sort.as_str(),
            "hotel search"
        );

        Ok(HotelSearchResult {
            total: items.len(),
            cities: distinct_cities(&hotels),
            items,
            sort,
        })
    }

    pub async fn featured(&self) -> AppResult<Vec<Hotel>> {
        self.repository.featured_hotels(FEATURED_LIMIT).await
    }

    pub async fn cities(&self) -> AppResult<Vec<String>> {
        let hotels = self.repository.list_hotels().await?;
        Ok(distinct_cities(&hotels))
    }

    pub async fn hotel_details(&self, id: &str) -> AppResult<HotelDetails> {
        let hotel = self
            .repository
            .get_hotel(id)
            .await?
            .ok_or_else(|| AppError::HotelNotFound(id.to_string()))?;
        let rooms = self.repository.rooms_for_hotel(id).await?;
        Ok(HotelDetails { hotel, rooms })
    }

    /// Prices a stay in a room without booking it.
    pub async fn quote(&self, room_id: &str, stay: StayQuery) -> AppResult<BookingQuote> {
        let room = self
            .repository
            .get_room(room_id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))?;

        let total = compute_booking_total(room.price_per_night, stay.check_in, stay.check_out)?;
        Ok(BookingQuote {
            room_id: room.id,
            nights: total.nights,
            nightly_price: room.price_per_night,
            total_price: total.total,
        })
    }

    // ---- admin: hotels ----

    /// All hotels, newest first, narrowed by name, city or country.
    pub async fn admin_list_hotels(&self, q: Option<&str>) -> AppResult<Vec<Hotel>> {
        let term = q.unwrap_or_default();
        let hotels = self.repository.list_hotels().await?;
        Ok(hotels
            .into_iter()
            .filter(|h| matches_any(term, [h.name.as_str(), h.city.as_str(), h.country.as_str()]))
            .collect())
    }

    pub async fn create_hotel(&self, req: HotelRequest) -> AppResult<Hotel> {
        req.validate()?;

        let hotel = req.into_hotel(IdGenerator::entity_id(), Utc::now().to_rfc3339());
        self.repository.insert_hotel(&hotel).await?;

        tracing::info!(id = %hotel.id, name = %hotel.name, "hotel created");
        Ok(hotel)
    }

    pub async fn update_hotel(&self, id: &str, req: HotelRequest) -> AppResult<Hotel> {
        req.validate()?;

        let existing = self
            .repository
            .get_hotel(id)
            .await?
            .ok_or_else(|| AppError::HotelNotFound(id.to_string()))?;
        let hotel = req.apply_to(existing);

        if !self.repository.update_hotel(&hotel).await? {
            return Err(AppError::HotelNotFound(id.to_string()));
        }

        tracing::info!(id = %hotel.id, "hotel updated");
        Ok(hotel)
    }

    pub async fn delete_hotel(&self, id: &str) -> AppResult<()> {
        if !self.repository.delete_hotel(id).await? {
            return Err(AppError::HotelNotFound(id.to_string()));
        }
        tracing::info!(id = %id, "hotel deleted");
        Ok(())
    }

    // ---- admin: rooms ----

    /// All rooms with their hotel name, narrowed by room or hotel name.
    pub async fn admin_list_rooms(&self, q: Option<&str>) -> AppResult<Vec<RoomListItem>> {
        let term = q.unwrap_or_default();
        let rooms = self.repository.list_rooms().await?;
        Ok(rooms
            .into_iter()
            .filter(|item| {
                matches_any(
                    term,
                    [item.room.name.as_str(), item.hotel_name.as_deref().unwrap_or_default()],
                )
            })
            .collect())
    }

    pub async fn create_room(&self, req: RoomRequest) -> AppResult<Room> {
        req.validate()?;
        self.ensure_hotel(&req.hotel_id).await?;

        let room = req.into_room(IdGenerator::entity_id(), Utc::now().to_rfc3339());
        self.repository.insert_room(&room).await?;

        tracing::info!(id = %room.id, hotel_id = %room.hotel_id, "room created");
        Ok(room)
    }

    pub async fn update_room(&self, id: &str, req: RoomRequest) -> AppResult<Room> {
        req.validate()?;

        let existing = self
            .repository
            .get_room(id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(id.to_string()))?;
        self.ensure_hotel(&req.hotel_id).await?;

        let room = req.into_room(existing.id, existing.created_at);
        if !self.repository.update_room(&room).await? {
            return Err(AppError::RoomNotFound(id.to_string()));
        }

        tracing::info!(id = %room.id, "room updated");
        Ok(room)
    }

    pub async fn delete_room(&self, id: &str) -> AppResult<()> {
        if !self.repository.delete_room(id).await? {
            return Err(AppError::RoomNotFound(id.to_string()));
        }
        tracing::info!(id = %id, "room deleted");
        Ok(())
    }

    // ---- internal ----

    pub async fn room_snapshot(&self, id: &str) -> AppResult<RoomSnapshot> {
        self.repository
            .room_snapshot(id)
            .await?
            .ok_or_else(|| AppError::RoomNotFound(id.to_string()))
    }

    pub async fn stats(&self) -> AppResult<CatalogStats> {
        self.repository.stats().await
    }

    async fn ensure_hotel(&self, hotel_id: &str) -> AppResult<()> {
        if self.repository.hotel_exists(hotel_id).await? {
            Ok(())
        } else {
            Err(AppError::HotelNotFound(hotel_id.to_string()))
        }
    }
}
