//! Booking service module.

use std::sync::Arc;

use chrono::Utc;

use common::errors::{AppError, AppResult};
use common::middleware::CurrentUser;
use common::models::{
    AdminBookingItem, AdminStats, Booking, BookingStatus, CreateBookingRequest, PaymentStatus,
    UserListItem,
};
use common::pricing::{compute_booking_total, validate_stay};
use common::utils::{matches_any, IdGenerator};

use crate::catalog_client::CatalogClient;
use crate::repository::BookingRepository;

/// Booking submission and management.
pub struct BookingService {
    repository: Arc<BookingRepository>,
    catalog: Arc<dyn CatalogClient>,
}

impl BookingService {
    pub fn new(repository: Arc<BookingRepository>, catalog: Arc<dyn CatalogClient>) -> Self {
        Self { repository, catalog }
    }

    /// Validates, prices and stores a booking for `user`.
    ///
    /// New bookings are always `pending` and `unpaid`. The hotel and room
    /// names are copied from the catalog at this point.
    pub async fn create(
        &self,
        user: &CurrentUser,
        req: CreateBookingRequest,
    ) -> AppResult<Booking> {
        let submission = req.into_submission()?;
        validate_stay(submission.check_in, submission.check_out)?;

        let room = self.catalog.room_snapshot(&submission.room_id).await?;
        let total = compute_booking_total(
            room.price_per_night,
            submission.check_in,
            submission.check_out,
        )?;

        let booking = Booking {
            id: IdGenerator::entity_id(),
            created_at: Utc::now().to_rfc3339(),
            user_id: user.id.clone(),
            hotel_id: room.hotel_id,
            room_id: room.room_id,
            hotel_name: room.hotel_name,
            room_name: room.room_name,
            check_in: submission.check_in,
            check_out: submission.check_out,
            guests: submission.guests,
            guest_name: submission.name,
            guest_email: submission.email,
            guest_phone: submission.phone,
            notes: submission.notes,
            total_price: total.total,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
        };
        self.repository.insert(&booking).await?;

        tracing::info!(
            id = %booking.id,
            reference = %IdGenerator::booking_reference(&booking.id),
            user_id = %booking.user_id,
            nights = total.nights,
            total_price = booking.total_price,
            "booking created"
        );
        Ok(booking)
    }

    pub async fn mine(&self, user: &CurrentUser) -> AppResult<Vec<Booking>> {
        self.repository.list_for_user(&user.id).await
    }

    /// All bookings, narrowed by guest name, hotel, room or booking id.
    pub async fn admin_list(&self, q: Option<&str>) -> AppResult<Vec<AdminBookingItem>> {
        let term = q.unwrap_or_default();
        let items = self.repository.list_with_user_names().await?;
        Ok(items
            .into_iter()
            .filter(|item| {
                matches_any(
                    term,
                    [
                        item.user_full_name.as_str(),
                        item.booking.hotel_name.as_str(),
                        item.booking.room_name.as_str(),
                        item.booking.id.as_str(),
                    ],
                )
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> AppResult<Booking> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))
    }

    pub async fn update_status(&self, id: &str, status: BookingStatus) -> AppResult<Booking> {
        if !self.repository.update_status(id, status).await? {
            return Err(AppError::BookingNotFound(id.to_string()));
        }
        tracing::info!(id = %id, status = %status, "booking status updated");
        self.get(id).await
    }

    pub async fn update_payment_status(
        &self,
        id: &str,
        status: PaymentStatus,
    ) -> AppResult<Booking> {
        if !self.repository.update_payment_status(id, status).await? {
            return Err(AppError::BookingNotFound(id.to_string()));
        }
        tracing::info!(id = %id, payment_status = %status, "booking payment status updated");
        self.get(id).await
    }

    /// All users, narrowed by full name or id.
    pub async fn list_users(&self, q: Option<&str>) -> AppResult<Vec<UserListItem>> {
        let term = q.unwrap_or_default();
        let profiles = self.repository.list_profiles().await?;
        Ok(profiles
            .into_iter()
            .map(UserListItem::from)
            .filter(|u| matches_any(term, [u.full_name.as_str(), u.profile.id.as_str()]))
            .collect())
    }

    pub async fn user_bookings(&self, user_id: &str) -> AppResult<Vec<Booking>> {
        if !self.repository.profile_exists(user_id).await? {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }
        self.repository.list_for_user(user_id).await
    }

    /// Dashboard counters. Revenue counts every booking regardless of status.
    pub async fn stats(&self) -> AppResult<AdminStats> {
        let catalog = self.catalog.stats().await?;
        let totals = self.repository.totals().await?;
        Ok(AdminStats {
            total_hotels: catalog.hotels,
            total_users: totals.users,
            total_bookings: totals.bookings,
            total_revenue: totals.revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_client::tests::StubCatalog;
    use crate::repository::tests::{booking, profile, repository};
    use chrono::NaiveDate;
    use common::db::upsert_profile;

    fn user() -> CurrentUser {
        CurrentUser { id: "u1".to_string(), is_admin: false }
    }

    fn request() -> CreateBookingRequest {
        CreateBookingRequest {
            room_id: Some("r1".to_string()),
            check_in: NaiveDate::from_ymd_opt(2024, 1, 1),
            check_out: NaiveDate::from_ymd_opt(2024, 1, 4),
            guests: Some(2),
            name: Some("Amal Saleh".to_string()),
            email: Some("amal@example.com".to_string()),
            phone: Some("+967 1 234 567".to_string()),
            notes: Some("Late arrival".to_string()),
        }
    }

    async fn service_with(catalog: StubCatalog) -> (BookingService, Arc<BookingRepository>) {
        let (repo, _) = repository().await;
        let repo = Arc::new(repo);
        (BookingService::new(repo.clone(), Arc::new(catalog)), repo)
    }

    #[tokio::test]
    async fn booking_is_priced_and_stored_pending_unpaid() {
        let (service, repo) = service_with(StubCatalog::with_room("r1", 100.0)).await;

        let created = service.create(&user(), request()).await.unwrap();
        assert_eq!(created.total_price, 300.0);
        assert_eq!(created.status, BookingStatus::Pending);
        assert_eq!(created.payment_status, PaymentStatus::Unpaid);
        assert_eq!(created.hotel_name, "Sheba Palace");
        assert_eq!(created.user_id, "u1");

        assert_eq!(repo.get(&created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn missing_fields_fail_before_the_catalog_is_asked() {
        let catalog = StubCatalog { unreachable: true, ..Default::default() };
        let (service, _) = service_with(catalog).await;

        let req = CreateBookingRequest { email: None, ..request() };
        let err = service.create(&user(), req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn reversed_dates_are_invalid_stay_dates() {
        let catalog = StubCatalog { unreachable: true, ..Default::default() };
        let (service, repo) = service_with(catalog).await;

        let req = CreateBookingRequest {
            check_in: NaiveDate::from_ymd_opt(2024, 1, 4),
            check_out: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..request()
        };
        let err = service.create(&user(), req).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStayDates));

        let same_day = CreateBookingRequest {
            check_out: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..request()
        };
        let err = service.create(&user(), same_day).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStayDates));
        assert_eq!(repo.totals().await.unwrap().bookings, 0);
    }

    #[tokio::test]
    async fn unknown_room_and_unreachable_catalog() {
        let (service, _) = service_with(StubCatalog::with_room("other", 100.0)).await;
        let err = service.create(&user(), request()).await.unwrap_err();
        assert!(matches!(err, AppError::RoomNotFound(_)));

        let catalog = StubCatalog { unreachable: true, ..StubCatalog::with_room("r1", 100.0) };
        let (service, _) = service_with(catalog).await;
        let err = service.create(&user(), request()).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[tokio::test]
    async fn admin_search_covers_name_hotel_room_and_id() {
        let (repo, pool) = repository().await;
        upsert_profile(&pool, &profile("u1", Some("Amal"), Some("Saleh"))).await.unwrap();
        repo.insert(&booking("abc123", "u1", "2024-01-01T00:00:00Z", 100.0)).await.unwrap();
        let service = BookingService::new(Arc::new(repo), Arc::new(StubCatalog::default()));

        for term in ["amal", "SHEBA", "deluxe", "abc1"] {
            assert_eq!(service.admin_list(Some(term)).await.unwrap().len(), 1, "term {term}");
        }
        assert!(service.admin_list(Some("zzz")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_changes_return_the_updated_booking() {
        let (repo, _) = repository().await;
        repo.insert(&booking("b1", "u1", "2024-01-01T00:00:00Z", 100.0)).await.unwrap();
        let service = BookingService::new(Arc::new(repo), Arc::new(StubCatalog::default()));

        let updated = service.update_status("b1", BookingStatus::Completed).await.unwrap();
        assert_eq!(updated.status, BookingStatus::Completed);
        let updated = service.update_payment_status("b1", PaymentStatus::Refunded).await.unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Refunded);

        let err = service.update_status("nope", BookingStatus::Canceled).await.unwrap_err();
        assert!(matches!(err, AppError::BookingNotFound(_)));
    }

    #[tokio::test]
    async fn users_are_searchable_and_their_bookings_listed() {
        let (repo, pool) = repository().await;
        upsert_profile(&pool, &profile("u1", Some("Amal"), None)).await.unwrap();
        upsert_profile(&pool, &profile("u2", None, None)).await.unwrap();
        repo.insert(&booking("b1", "u1", "2024-01-01T00:00:00Z", 100.0)).await.unwrap();
        let service = BookingService::new(Arc::new(repo), Arc::new(StubCatalog::default()));

        let users = service.list_users(Some("unknown")).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].profile.id, "u2");

        assert_eq!(service.user_bookings("u1").await.unwrap().len(), 1);
        assert!(service.user_bookings("u2").await.unwrap().is_empty());
        assert!(matches!(service.user_bookings("u9").await, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn stats_combine_catalog_and_bookings() {
        let (repo, pool) = repository().await;
        upsert_profile(&pool, &profile("u1", None, None)).await.unwrap();
        repo.insert(&booking("b1", "u1", "2024-01-01T00:00:00Z", 300.0)).await.unwrap();
        repo.insert(&booking("b2", "u1", "2024-01-02T00:00:00Z", 200.0)).await.unwrap();
        let service = BookingService::new(Arc::new(repo), Arc::new(StubCatalog::with_room("r1", 100.0)));

        let stats = service.stats().await.unwrap();
        assert_eq!(
            stats,
            AdminStats { total_hotels: 3, total_users: 1, total_bookings: 2, total_revenue: 500.0 }
        );
    }
}
