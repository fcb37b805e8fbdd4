//! Stay pricing.
//!
//! A stay costs `nightly price × nights`, where nights is the number of
//! started days between check-in and check-out. A stay of zero or fewer
//! nights is rejected with [`AppError::InvalidStayDates`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Nights and total price of a valid stay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct BookingTotal {
    pub nights: i64,
    pub total: f64,
}

/// Number of nights between two instants, rounding partial days up.
///
/// Returns zero or a negative number when `check_out` is not after `check_in`.
pub fn count_nights_between(check_in: NaiveDateTime, check_out: NaiveDateTime) -> i64 {
    let seconds = (check_out - check_in).num_seconds();
    // ceiling division that also holds for negative spans
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

/// Number of nights between two calendar dates.
pub fn count_nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    count_nights_between(
        check_in.and_time(NaiveTime::MIN),
        check_out.and_time(NaiveTime::MIN),
    )
}

/// Checks that check-out is strictly after check-in and returns the nights.
pub fn validate_stay(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<i64> {
    let nights = count_nights(check_in, check_out);
    if nights <= 0 {
        return Err(AppError::InvalidStayDates);
    }
    Ok(nights)
}

/// Computes the price of a stay.
///
/// # Errors
/// - [`AppError::BadRequest`] if the nightly price is not a positive finite number.
/// - [`AppError::InvalidStayDates`] if check-out is not after check-in.
pub fn compute_booking_total(
    nightly_price: f64,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> AppResult<BookingTotal> {
    if !nightly_price.is_finite() || nightly_price <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "nightly price must be positive, got {nightly_price}"
        )));
    }

    let nights = validate_stay(check_in, check_out)?;
    Ok(BookingTotal {
        nights,
        total: nightly_price * nights as f64,
    })
}
