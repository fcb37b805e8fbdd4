//! Hotel and room storage.
//!
//! Hotels and rooms live in the shared SQLite database. List columns
//! (amenities, images) are stored as JSON text; rows are converted into the
//! typed models on the way out and rejected if they hold impossible values.

use common::errors::{AppError, AppResult};
use common::models::{CatalogStats, Coordinates, Hotel, Room, RoomListItem, RoomSnapshot};
use sqlx::SqlitePool;

/// Row from the `hotels` table.
#[derive(sqlx::FromRow)]
struct HotelRow {
    id: String,
    created_at: String,
    name: String,
    description: String,
    address: String,
    city: String,
    country: String,
    price_per_night: f64,
    stars: i64,
    rating: Option<f64>,
    review_count: Option<i64>,
    featured: bool,
    latitude: Option<f64>,
    longitude: Option<f64>,
    amenities: String,
    images: String,
}

impl TryFrom<HotelRow> for Hotel {
    type Error = AppError;

    fn try_from(row: HotelRow) -> AppResult<Self> {
        let stars = u8::try_from(row.stars)
            .ok()
            .filter(|s| (1..=5).contains(s))
            .ok_or_else(|| {
                AppError::DatabaseQuery(format!("hotel {} has invalid stars {}", row.id, row.stars))
            })?;

        let coordinates = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };

        Ok(Hotel {
            id: row.id,
            created_at: row.created_at,
            name: row.name,
            description: row.description,
            address: row.address,
            city: row.city,
            country: row.country,
            price_per_night: row.price_per_night,
            stars,
            rating: row.rating,
            review_count: row.review_count.and_then(|c| u32::try_from(c).ok()),
            featured: row.featured,
            coordinates,
            amenities: decode_list(&row.amenities),
            images: decode_list(&row.images),
        })
    }
}

/// Row from the `rooms` table.
#[derive(sqlx::FromRow)]
struct RoomRow {
    id: String,
    created_at: String,
    hotel_id: String,
    name: String,
    description: String,
    price_per_night: f64,
    capacity: i64,
    amenities: String,
    images: String,
}

impl TryFrom<RoomRow> for Room {
    type Error = AppError;

    fn try_from(row: RoomRow) -> AppResult<Self> {
        let capacity = u32::try_from(row.capacity).map_err(|_| {
            let msg = format!("room {} has invalid capacity {}", row.id, row.capacity);
            AppError::DatabaseQuery(msg)
        })?;

        Ok(Room {
            id: row.id,
            created_at: row.created_at,
            hotel_id: row.hotel_id,
            name: row.name,
            description: row.description,
            price_per_night: row.price_per_night,
            capacity,
            amenities: decode_list(&row.amenities),
            images: decode_list(&row.images),
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoomListRow {
    #[sqlx(flatten)]
    room: RoomRow,
    hotel_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    room_id: String,
    room_name: String,
    hotel_id: String,
    hotel_name: String,
    price_per_night: f64,
    capacity: i64,
}

/// Absent or malformed lists read as empty.
fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn encode_list(list: &[String]) -> AppResult<String> {
    serde_json::to_string(list)
        .map_err(|e| AppError::Internal(format!("Failed to encode list: {e}")))
}

const HOTEL_COLUMNS: &str = "id, created_at, name, description, address, city, country, \
     price_per_night, stars, rating, review_count, featured, latitude, longitude, amenities, images";

/// Hotel and room persistence.
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates the repository, creating the catalog tables if needed.
    pub async fn new(pool: SqlitePool) -> AppResult<Self> {
        let repo = Self { pool };
        repo.ensure_tables().await?;
        Ok(repo)
    }

    async fn ensure_tables(&self) -> AppResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS hotels (
                id              TEXT    PRIMARY KEY NOT NULL,
                created_at      TEXT    NOT NULL,
                name            TEXT    NOT NULL,
                description     TEXT    NOT NULL DEFAULT '',
                address         TEXT    NOT NULL DEFAULT '',
                city            TEXT    NOT NULL,
                country         TEXT    NOT NULL DEFAULT '',
                price_per_night REAL    NOT NULL,
                stars           INTEGER NOT NULL,
                rating          REAL,
                review_count    INTEGER,
                featured        INTEGER NOT NULL DEFAULT 0,
                latitude        REAL,
                longitude       REAL,
                amenities       TEXT    NOT NULL DEFAULT '[]',
                images          TEXT    NOT NULL DEFAULT '[]'
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("Failed to create hotels table: {e}")))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rooms (
                id              TEXT    PRIMARY KEY NOT NULL,
                created_at      TEXT    NOT NULL,
                hotel_id        TEXT    NOT NULL REFERENCES hotels(id) ON DELETE CASCADE,
                name            TEXT    NOT NULL,
                description     TEXT    NOT NULL DEFAULT '',
                price_per_night REAL    NOT NULL,
                capacity        INTEGER NOT NULL DEFAULT 1,
                amenities       TEXT    NOT NULL DEFAULT '[]',
                images          TEXT    NOT NULL DEFAULT '[]'
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("Failed to create rooms table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_rooms_hotel_id ON rooms (hotel_id)")
            .execute(&self.pool)
            .await?;

        tracing::info!("Catalog tables ensured");
        Ok(())
    }

    // ---- hotels ----

    /// All hotels, newest first.
    pub async fn list_hotels(&self) -> AppResult<Vec<Hotel>> {
        let rows: Vec<HotelRow> = sqlx::query_as(&format!(
            "SELECT {HOTEL_COLUMNS} FROM hotels ORDER BY created_at DESC, rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Hotel::try_from).collect()
    }

    pub async fn featured_hotels(&self, limit: u32) -> AppResult<Vec<Hotel>> {
        let rows: Vec<HotelRow> = sqlx::query_as(&format!(
            "SELECT {HOTEL_COLUMNS} FROM hotels WHERE featured = 1
             ORDER BY created_at DESC, rowid DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Hotel::try_from).collect()
    }

    pub async fn get_hotel(&self, id: &str) -> AppResult<Option<Hotel>> {
        let row: Option<HotelRow> =
            sqlx::query_as(&format!("SELECT {HOTEL_COLUMNS} FROM hotels WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Hotel::try_from).transpose()
    }

    pub async fn hotel_exists(&self, id: &str) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM hotels WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn insert_hotel(&self, hotel: &Hotel) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO hotels ({HOTEL_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&hotel.id)
        .bind(&hotel.created_at)
        .bind(&hotel.name)
        .bind(&hotel.description)
        .bind(&hotel.address)
        .bind(&hotel.city)
        .bind(&hotel.country)
        .bind(hotel.price_per_night)
        .bind(i64::from(hotel.stars))
        .bind(hotel.rating)
        .bind(hotel.review_count.map(i64::from))
        .bind(hotel.featured)
        .bind(hotel.coordinates.map(|c| c.lat))
        .bind(hotel.coordinates.map(|c| c.lng))
        .bind(encode_list(&hotel.amenities)?)
        .bind(encode_list(&hotel.images)?)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("Failed to save hotel: {e}")))?;

        Ok(())
    }

    /// Overwrites the editable columns. Returns `false` if the hotel does not exist.
    pub async fn update_hotel(&self, hotel: &Hotel) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE hotels SET
                name = ?, description = ?, address = ?, city = ?, country = ?,
                price_per_night = ?, stars = ?, featured = ?, latitude = ?, longitude = ?,
                amenities = ?, images = ?
             WHERE id = ?",
        )
        .bind(&hotel.name)
        .bind(&hotel.description)
        .bind(&hotel.address)
        .bind(&hotel.city)
        .bind(&hotel.country)
        .bind(hotel.price_per_night)
        .bind(i64::from(hotel.stars))
        .bind(hotel.featured)
        .bind(hotel.coordinates.map(|c| c.lat))
        .bind(hotel.coordinates.map(|c| c.lng))
        .bind(encode_list(&hotel.amenities)?)
        .bind(encode_list(&hotel.images)?)
        .bind(&hotel.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a hotel together with its rooms. Returns `false` if it did not exist.
    pub async fn delete_hotel(&self, id: &str) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM rooms WHERE hotel_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM hotels WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- rooms ----

    /// All rooms with their hotel name, newest first.
    pub async fn list_rooms(&self) -> AppResult<Vec<RoomListItem>> {
        let rows: Vec<RoomListRow> = sqlx::query_as(
            "SELECT r.id, r.created_at, r.hotel_id, r.name, r.description, r.price_per_night,
                    r.capacity, r.amenities, r.images, h.name AS hotel_name
             FROM rooms r
             LEFT JOIN hotels h ON h.id = r.hotel_id
             ORDER BY r.created_at DESC, r.rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> AppResult<RoomListItem> {
                Ok(RoomListItem {
                    room: Room::try_from(row.room)?,
                    hotel_name: row.hotel_name,
                })
            })
            .collect()
    }

    pub async fn rooms_for_hotel(&self, hotel_id: &str) -> AppResult<Vec<Room>> {
        let rows: Vec<RoomRow> = sqlx::query_as(
            "SELECT id, created_at, hotel_id, name, description, price_per_night, capacity, amenities, images
             FROM rooms WHERE hotel_id = ?
             ORDER BY price_per_night ASC, created_at ASC",
        )
        .bind(hotel_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Room::try_from).collect()
    }

    pub async fn get_room(&self, id: &str) -> AppResult<Option<Room>> {
        let row: Option<RoomRow> = sqlx::query_as(
            "SELECT id, created_at, hotel_id, name, description, price_per_night, capacity, amenities, images
             FROM rooms WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Room::try_from).transpose()
    }

    /// Room price and labels for pricing a booking.
    pub async fn room_snapshot(&self, id: &str) -> AppResult<Option<RoomSnapshot>> {
        let row: Option<SnapshotRow> = sqlx::query_as(
            "SELECT r.id AS room_id, r.name AS room_name, r.hotel_id, h.name AS hotel_name,
                    r.price_per_night, r.capacity
             FROM rooms r
             JOIN hotels h ON h.id = r.hotel_id
             WHERE r.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> AppResult<RoomSnapshot> {
            let capacity = u32::try_from(row.capacity).map_err(|_| {
                let msg = format!("room {} has invalid capacity {}", row.room_id, row.capacity);
                AppError::DatabaseQuery(msg)
            })?;
            Ok(RoomSnapshot {
                room_id: row.room_id,
                room_name: row.room_name,
                hotel_id: row.hotel_id,
                hotel_name: row.hotel_name,
                price_per_night: row.price_per_night,
                capacity,
            })
        })
        .transpose()
    }

    pub async fn insert_room(&self, room: &Room) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO rooms (id, created_at, hotel_id, name, description, price_per_night, capacity, amenities, images)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&room.id)
        .bind(&room.created_at)
        .bind(&room.hotel_id)
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.price_per_night)
        .bind(i64::from(room.capacity))
        .bind(encode_list(&room.amenities)?)
        .bind(encode_list(&room.images)?)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("Failed to save room: {e}")))?;

        Ok(())
    }

    /// Returns `false` if the room does not exist.
    pub async fn update_room(&self, room: &Room) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE rooms SET
                hotel_id = ?, name = ?, description = ?, price_per_night = ?, capacity = ?,
                amenities = ?, images = ?
             WHERE id = ?",
        )
        .bind(&room.hotel_id)
        .bind(&room.name)
        .bind(&room.description)
        .bind(room.price_per_night)
        .bind(i64::from(room.capacity))
        .bind(encode_list(&room.amenities)?)
        .bind(encode_list(&room.images)?)
        .bind(&room.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` if the room does not exist.
    pub async fn delete_room(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats(&self) -> AppResult<CatalogStats> {
        let (hotels, rooms): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM hotels), (SELECT COUNT(*) FROM rooms)",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogStats {
            hotels: hotels.max(0) as u64,
            rooms: rooms.max(0) as u64,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) async fn repository() -> CatalogRepository {
        let pool = common::db::connect("sqlite::memory:").await.unwrap();
        CatalogRepository::new(pool).await.unwrap()
    }

    pub(crate) fn hotel(id: &str, created_at: &str, price: f64) -> Hotel {
        Hotel {
            id: id.to_string(),
            created_at: created_at.to_string(),
            name: format!("Hotel {id}"),
            description: "Near the old city".to_string(),
            address: "Main St".to_string(),
            city: "Sanaa".to_string(),
            country: "Yemen".to_string(),
            price_per_night: price,
            stars: 4,
            rating: Some(4.2),
            review_count: Some(10),
            featured: false,
            coordinates: Some(Coordinates { lat: 15.35, lng: 44.2 }),
            amenities: vec!["Free WiFi".to_string(), "Pool".to_string()],
            images: vec!["https://img.example/1.jpg".to_string()],
        }
    }

    pub(crate) fn room(id: &str, hotel_id: &str, price: f64) -> Room {
        Room {
            id: id.to_string(),
            created_at: "2024-02-01T00:00:00+00:00".to_string(),
            hotel_id: hotel_id.to_string(),
            name: format!("Room {id}"),
            description: "Two beds".to_string(),
            price_per_night: price,
            capacity: 2,
            amenities: vec![],
            images: vec![],
        }
    }

    #[tokio::test]
    async fn hotels_round_trip_and_list_newest_first() {
        let repo = repository().await;
        repo.insert_hotel(&hotel("old", "2024-01-01T00:00:00+00:00", 100.0)).await.unwrap();
        repo.insert_hotel(&hotel("new", "2024-03-01T00:00:00+00:00", 200.0)).await.unwrap();

        let listed = repo.list_hotels().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);

        let fetched = repo.get_hotel("old").await.unwrap().unwrap();
        assert_eq!(fetched, hotel("old", "2024-01-01T00:00:00+00:00", 100.0));
    }

    #[tokio::test]
    async fn malformed_lists_and_bad_stars_are_handled_at_the_boundary() {
        let repo = repository().await;
        repo.insert_hotel(&hotel("h", "2024-01-01T00:00:00+00:00", 100.0)).await.unwrap();

        sqlx::query("UPDATE hotels SET amenities = 'not json' WHERE id = 'h'")
            .execute(&repo.pool)
            .await
            .unwrap();
        assert!(repo.get_hotel("h").await.unwrap().unwrap().amenities.is_empty());

        sqlx::query("UPDATE hotels SET stars = 9 WHERE id = 'h'")
            .execute(&repo.pool)
            .await
            .unwrap();
        assert!(matches!(repo.get_hotel("h").await, Err(AppError::DatabaseQuery(_))));
    }

    #[tokio::test]
    async fn featured_hotels_are_limited() {
        let repo = repository().await;
        for i in 0..6 {
            let mut h = hotel(&format!("f{i}"), &format!("2024-01-0{}T00:00:00+00:00", i + 1), 50.0);
            h.featured = i != 0;
            repo.insert_hotel(&h).await.unwrap();
        }
        let featured = repo.featured_hotels(4).await.unwrap();
        assert_eq!(featured.len(), 4);
        assert!(featured.iter().all(|h| h.featured));
        assert_eq!(featured[0].id, "f5");
    }

    #[tokio::test]
    async fn deleting_a_hotel_removes_its_rooms() {
        let repo = repository().await;
        repo.insert_hotel(&hotel("h", "2024-01-01T00:00:00+00:00", 100.0)).await.unwrap();
        repo.insert_room(&room("r1", "h", 80.0)).await.unwrap();
        repo.insert_room(&room("r2", "h", 60.0)).await.unwrap();

        let rooms = repo.rooms_for_hotel("h").await.unwrap();
        assert_eq!(rooms.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["r2", "r1"]);

        assert!(repo.delete_hotel("h").await.unwrap());
        assert!(repo.get_room("r1").await.unwrap().is_none());
        assert!(!repo.delete_hotel("h").await.unwrap());
        assert_eq!(repo.stats().await.unwrap().rooms, 0);
    }

    #[tokio::test]
    async fn snapshot_joins_hotel_name() {
        let repo = repository().await;
        repo.insert_hotel(&hotel("h", "2024-01-01T00:00:00+00:00", 100.0)).await.unwrap();
        repo.insert_room(&room("r1", "h", 75.5)).await.unwrap();

        let snapshot = repo.room_snapshot("r1").await.unwrap().unwrap();
        assert_eq!(snapshot.hotel_name, "Hotel h");
        assert_eq!(snapshot.price_per_night, 75.5);
        assert!(repo.room_snapshot("missing").await.unwrap().is_none());

        let listed = repo.list_rooms().await.unwrap();
        assert_eq!(listed[0].hotel_name.as_deref(), Some("Hotel h"));
    }

    #[tokio::test]
    async fn updates_report_missing_rows() {
        let repo = repository().await;
        let mut h = hotel("h", "2024-01-01T00:00:00+00:00", 100.0);
        assert!(!repo.update_hotel(&h).await.unwrap());

        repo.insert_hotel(&h).await.unwrap();
        h.price_per_night = 130.0;
        assert!(repo.update_hotel(&h).await.unwrap());
        assert_eq!(repo.get_hotel("h").await.unwrap().unwrap().price_per_night, 130.0);

        assert!(!repo.update_room(&room("nope", "h", 10.0)).await.unwrap());
        assert!(!repo.delete_room("nope").await.unwrap());
    }
}
