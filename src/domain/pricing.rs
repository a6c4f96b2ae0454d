//! Pricing calculator
//!
//! Pure date/price arithmetic for rental quotes. Both endpoints of the date
//! range are billed, so a same-day rental counts as one day. The total is
//! returned unrounded; currency formatting is left to clients.

use chrono::NaiveDate;

use super::errors::RentalError;

/// Number of billed days required before a weekly discount applies.
pub const WEEKLY_DISCOUNT_MIN_DAYS: i64 = 7;

/// A priced rental quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub days: i64,
    pub subtotal: f64,
    pub discount_applied: bool,
    pub total: f64,
}

/// Compute the number of billed days for a date range (inclusive of both ends).
///
/// Fails with `InvalidDateRange` when the end date precedes the start date.
pub fn billed_days(start_date: NaiveDate, end_date: NaiveDate) -> Result<i64, RentalError> {
    let days = (end_date - start_date).num_days() + 1;
    if days < 1 {
        return Err(RentalError::InvalidDateRange);
    }
    Ok(days)
}

/// Compute a quote for a rental of `daily_rate` per day over the given range,
/// with an optional weekly discount percentage (0-100).
pub fn quote(
    start_date: NaiveDate,
    end_date: NaiveDate,
    daily_rate: f64,
    weekly_discount_percent: i32,
) -> Result<Quote, RentalError> {
    let days = billed_days(start_date, end_date)?;

    let subtotal = days as f64 * daily_rate;

    let discount_applied = days >= WEEKLY_DISCOUNT_MIN_DAYS && weekly_discount_percent > 0;
    let total = if discount_applied {
        subtotal * (1.0 - weekly_discount_percent as f64 / 100.0)
    } else {
        subtotal
    };

    Ok(Quote {
        days,
        subtotal,
        discount_applied,
        total,
    })
}
