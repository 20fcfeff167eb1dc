//! # Fee Rule
//!
//! Billable day counting and the Open → Closed transition of a rental.
//!
//! ## Day Rounding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  billable_days = max(1, ceil(elapsed / 24h))                            │
//! │                                                                         │
//! │  elapsed      0h   14h   24h   24h+1s   48h   49h                       │
//! │  days          1     1     1      2       2     3                       │
//! │                                                                         │
//! │  Every started 24-hour period is billed. Returning at the pickup        │
//! │  instant, or with a clock that went backwards, bills one day.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Elapsed time is measured at millisecond precision.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Closure, Rental};
use crate::MIN_BILLABLE_DAYS;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Number of days charged for a rental spanning `start..end`.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use rentline_core::fee::billable_days;
///
/// let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
/// assert_eq!(billable_days(start, start), 1);
/// assert_eq!(billable_days(start, start + Duration::hours(48)), 2);
/// assert_eq!(billable_days(start, start + Duration::hours(49)), 3);
/// ```
pub fn billable_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let elapsed = (end - start).num_milliseconds();
    if elapsed <= 0 {
        return MIN_BILLABLE_DAYS;
    }

    let days = (elapsed + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
    days.max(MIN_BILLABLE_DAYS)
}

/// Fee for a rental spanning `start..end` at `daily_rate`, or `None`
/// when it overflows.
#[inline]
pub fn compute_fee(start: DateTime<Utc>, end: DateTime<Utc>, daily_rate: Money) -> Option<Money> {
    daily_rate.multiply_days(billable_days(start, end))
}

/// Computes the values the close transition writes.
///
/// Only an open rental can be closed; a closed rental is terminal and
/// yields `AlreadyClosed` without touching its recorded end date or fee.
///
/// ## User Workflow
/// ```text
/// Return car (rental R, now)
///      │
///      ▼
/// close(R, now, car.daily_rate) ← THIS FUNCTION
///      │
///      ├── R closed?  → AlreadyClosed { rental_id: R }
///      ├── overflow?  → FeeOverflow { rental_id: R }
///      │
///      └── Closure { end_date: now, fee: days × rate }
///              │
///              ▼
///          single UPDATE of end_date + fee (rentline-db)
/// ```
pub fn close(rental: &Rental, end: DateTime<Utc>, daily_rate: Money) -> CoreResult<Closure> {
    if !rental.is_open() {
        return Err(CoreError::AlreadyClosed {
            rental_id: rental.id.clone(),
        });
    }

    let days = billable_days(rental.start_date, end);
    let fee = daily_rate
        .multiply_days(days)
        .ok_or_else(|| CoreError::FeeOverflow {
            rental_id: rental.id.clone(),
        })?;

    Ok(Closure {
        end_date: end,
        fee,
        billable_days: days,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
