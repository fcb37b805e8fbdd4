//! Booking and profile storage.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use common::errors::{AppError, AppResult};
use common::models::profile::full_name;
use common::models::{AdminBookingItem, Booking, BookingStatus, PaymentStatus, Profile};

const DATE_FORMAT: &str = "%Y-%m-%d";

const BOOKING_COLUMNS: &str = "b.id, b.created_at, b.user_id, b.hotel_id, b.room_id, b.hotel_name, \
     b.room_name, b.check_in, b.check_out, b.guests, b.guest_name, b.guest_email, b.guest_phone, \
     b.notes, b.total_price, b.status, b.payment_status";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: String,
    created_at: String,
    user_id: String,
    hotel_id: String,
    room_id: String,
    hotel_name: String,
    room_name: String,
    check_in: String,
    check_out: String,
    guests: i64,
    guest_name: String,
    guest_email: String,
    guest_phone: String,
    notes: Option<String>,
    total_price: f64,
    status: String,
    payment_status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> AppResult<Self> {
        let date = |raw: &str| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
                AppError::DatabaseQuery(format!("booking {} has invalid date `{raw}`: {e}", row.id))
            })
        };
        let check_in = date(&row.check_in)?;
        let check_out = date(&row.check_out)?;
        let guests = u32::try_from(row.guests).map_err(|_| {
            let msg = format!("booking {} has invalid guest count {}", row.id, row.guests);
            AppError::DatabaseQuery(msg)
        })?;

        Ok(Booking {
            check_in,
            check_out,
            guests,
            status: row.status.parse::<BookingStatus>()?,
            payment_status: row.payment_status.parse::<PaymentStatus>()?,
            id: row.id,
            created_at: row.created_at,
            user_id: row.user_id,
            hotel_id: row.hotel_id,
            room_id: row.room_id,
            hotel_name: row.hotel_name,
            room_name: row.room_name,
            guest_name: row.guest_name,
            guest_email: row.guest_email,
            guest_phone: row.guest_phone,
            notes: row.notes,
            total_price: row.total_price,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdminBookingRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    created_at: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    avatar_url: Option<String>,
    is_admin: bool,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            created_at: row.created_at,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            avatar_url: row.avatar_url,
            is_admin: row.is_admin,
        }
    }
}

/// Totals over the bookings and profiles tables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingTotals {
    pub users: u64,
    pub bookings: u64,
    pub revenue: f64,
}

/// Booking and profile persistence.
pub struct BookingRepository {
    pool: SqlitePool,
}

impl BookingRepository {
    /// Creates the repository, creating the bookings table if needed.
    pub async fn new(pool: SqlitePool) -> AppResult<Self> {
        let repo = Self { pool };
        repo.ensure_table().await?;
        Ok(repo)
    }

    async fn ensure_table(&self) -> AppResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS bookings (
                id              TEXT    PRIMARY KEY NOT NULL,
                created_at      TEXT    NOT NULL,
                user_id         TEXT    NOT NULL,
                hotel_id        TEXT    NOT NULL,
                room_id         TEXT    NOT NULL,
                hotel_name      TEXT    NOT NULL,
                room_name       TEXT    NOT NULL,
                check_in        TEXT    NOT NULL,
                check_out       TEXT    NOT NULL,
                guests          INTEGER NOT NULL,
                guest_name      TEXT    NOT NULL,
                guest_email     TEXT    NOT NULL,
                guest_phone     TEXT    NOT NULL,
                notes           TEXT,
                total_price     REAL    NOT NULL,
                status          TEXT    NOT NULL DEFAULT 'pending',
                payment_status  TEXT    NOT NULL DEFAULT 'unpaid'
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("Failed to create bookings table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_user_id ON bookings (user_id)")
            .execute(&self.pool)
            .await?;

        tracing::info!("Bookings table ensured");
        Ok(())
    }

    pub async fn insert(&self, booking: &Booking) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO bookings (id, created_at, user_id, hotel_id, room_id, hotel_name, room_name,
                check_in, check_out, guests, guest_name, guest_email, guest_phone, notes,
                total_price, status, payment_status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&booking.id)
        .bind(&booking.created_at)
        .bind(&booking.user_id)
        .bind(&booking.hotel_id)
        .bind(&booking.room_id)
        .bind(&booking.hotel_name)
        .bind(&booking.room_name)
        .bind(booking.check_in.format(DATE_FORMAT).to_string())
        .bind(booking.check_out.format(DATE_FORMAT).to_string())
        .bind(i64::from(booking.guests))
        .bind(&booking.guest_name)
        .bind(&booking.guest_email)
        .bind(&booking.guest_phone)
        .bind(&booking.notes)
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseQuery(format!("Failed to save booking: {e}")))?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<Booking>> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Booking::try_from).transpose()
    }

    /// A user's bookings, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b
             WHERE b.user_id = ?
             ORDER BY b.created_at DESC, b.rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    /// Every booking with the booking user's display name, newest first.
    pub async fn list_with_user_names(&self) -> AppResult<Vec<AdminBookingItem>> {
        let rows: Vec<AdminBookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS}, p.first_name, p.last_name
             FROM bookings b
             LEFT JOIN profiles p ON p.id = b.user_id
             ORDER BY b.created_at DESC, b.rowid DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> AppResult<AdminBookingItem> {
                Ok(AdminBookingItem {
                    user_full_name: full_name(row.first_name.as_deref(), row.last_name.as_deref()),
                    booking: Booking::try_from(row.booking)?,
                })
            })
            .collect()
    }

    /// Returns `false` if the booking does not exist.
    pub async fn update_status(&self, id: &str, status: BookingStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` if the booking does not exist.
    pub async fn update_payment_status(&self, id: &str, status: PaymentStatus) -> AppResult<bool> {
        let result = sqlx::query("UPDATE bookings SET payment_status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All profiles, newest first.
    pub async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            "SELECT id, created_at, email, first_name, last_name, avatar_url, is_admin
             FROM profiles ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    pub async fn profile_exists(&self, id: &str) -> AppResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn totals(&self) -> AppResult<BookingTotals> {
        let (users, bookings, revenue): (i64, i64, f64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM profiles),
                    (SELECT COUNT(*) FROM bookings),
                    (SELECT COALESCE(SUM(total_price), 0.0) FROM bookings)",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(BookingTotals {
            users: users.max(0) as u64,
            bookings: bookings.max(0) as u64,
            revenue,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use common::db::{connect, ensure_account_tables, upsert_profile};

    pub(crate) async fn repository() -> (BookingRepository, SqlitePool) {
        let pool = connect("sqlite::memory:").await.unwrap();
        ensure_account_tables(&pool).await.unwrap();
        let repo = BookingRepository::new(pool.clone()).await.unwrap();
        (repo, pool)
    }

    pub(crate) fn profile(id: &str, first: Option<&str>, last: Option<&str>) -> Profile {
        Profile {
            id: id.to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            email: format!("{id}@example.com"),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            avatar_url: None,
            is_admin: false,
        }
    }

    pub(crate) fn booking(id: &str, user_id: &str, created_at: &str, total: f64) -> Booking {
        Booking {
            id: id.to_string(),
            created_at: created_at.to_string(),
            user_id: user_id.to_string(),
            hotel_id: "h1".to_string(),
            room_id: "r1".to_string(),
            hotel_name: "Sheba Palace".to_string(),
            room_name: "Deluxe".to_string(),
            check_in: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            guests: 2,
            guest_name: "Amal Saleh".to_string(),
            guest_email: "amal@example.com".to_string(),
            guest_phone: "+967 1 234 567".to_string(),
            notes: None,
            total_price: total,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
        }
    }

    #[tokio::test]
    async fn bookings_round_trip() {
        let (repo, _) = repository().await;
        let stored = booking("b1", "u1", "2024-01-01T00:00:00Z", 300.0);
        repo.insert(&stored).await.unwrap();

        assert_eq!(repo.get("b1").await.unwrap(), Some(stored));
        assert_eq!(repo.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn user_bookings_are_newest_first() {
        let (repo, _) = repository().await;
        repo.insert(&booking("old", "u1", "2024-01-01T00:00:00Z", 100.0)).await.unwrap();
        repo.insert(&booking("new", "u1", "2024-02-01T00:00:00Z", 100.0)).await.unwrap();
        repo.insert(&booking("other", "u2", "2024-03-01T00:00:00Z", 100.0)).await.unwrap();

        let ids: Vec<String> = repo
            .list_for_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn admin_list_falls_back_to_unknown_name() {
        let (repo, pool) = repository().await;
        upsert_profile(&pool, &profile("u1", Some("Amal"), Some("Saleh"))).await.unwrap();
        repo.insert(&booking("b1", "u1", "2024-01-01T00:00:00Z", 100.0)).await.unwrap();
        repo.insert(&booking("b2", "ghost", "2024-01-02T00:00:00Z", 100.0)).await.unwrap();

        let items = repo.list_with_user_names().await.unwrap();
        assert_eq!(items[0].booking.id, "b2");
        assert_eq!(items[0].user_full_name, "Unknown");
        assert_eq!(items[1].user_full_name, "Amal Saleh");
    }

    #[tokio::test]
    async fn status_updates_touch_only_their_column() {
        let (repo, _) = repository().await;
        repo.insert(&booking("b1", "u1", "2024-01-01T00:00:00Z", 100.0)).await.unwrap();

        assert!(repo.update_status("b1", BookingStatus::Confirmed).await.unwrap());
        assert!(repo.update_payment_status("b1", PaymentStatus::Paid).await.unwrap());
        assert!(!repo.update_status("missing", BookingStatus::Canceled).await.unwrap());

        let stored = repo.get("b1").await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn unknown_status_text_is_a_database_error() {
        let (repo, pool) = repository().await;
        repo.insert(&booking("b1", "u1", "2024-01-01T00:00:00Z", 100.0)).await.unwrap();
        sqlx::query("UPDATE bookings SET status = 'lost' WHERE id = 'b1'")
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(repo.get("b1").await, Err(AppError::DatabaseQuery(_))));
    }

    #[tokio::test]
    async fn totals_sum_every_booking() {
        let (repo, pool) = repository().await;
        assert_eq!(
            repo.totals().await.unwrap(),
            BookingTotals { users: 0, bookings: 0, revenue: 0.0 }
        );

        upsert_profile(&pool, &profile("u1", None, None)).await.unwrap();
        repo.insert(&booking("b1", "u1", "2024-01-01T00:00:00Z", 300.0)).await.unwrap();
        let mut canceled = booking("b2", "u1", "2024-01-02T00:00:00Z", 150.5);
        canceled.status = BookingStatus::Canceled;
        repo.insert(&canceled).await.unwrap();

        assert_eq!(
            repo.totals().await.unwrap(),
            BookingTotals { users: 1, bookings: 2, revenue: 450.5 }
        );
        assert!(repo.profile_exists("u1").await.unwrap());
        assert!(!repo.profile_exists("u2").await.unwrap());
    }
}
