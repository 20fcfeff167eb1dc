//! # Rental Lifecycle
//!
//! The Open → Closed transition.
//!
//! ## State Machine
//! ```text
//!            try_open_rental
//!                  │
//!                  ▼
//!          ┌──────────────┐   close_rental    ┌──────────────┐
//!          │     Open     │ ────────────────► │    Closed    │ (terminal)
//!          │ end_date NULL│                   │ end_date set │
//!          │ fee NULL     │                   │ fee set      │
//!          └──────────────┘                   └──────────────┘
//!                                                    │
//!                                      close again ──┴──► AlreadyClosed
//! ```
//!
//! ## The Close Write
//! The fee is computed from the rate read just before the write, and the
//! write only lands if nothing moved in between:
//!
//! ```sql
//! UPDATE rentals SET end_date = ?, fee_cents = ?
//! WHERE id = ? AND end_date IS NULL AND car_id = ?
//!   AND EXISTS (SELECT 1 FROM cars WHERE id = ? AND daily_rate_cents = ?)
//! ```
//!
//! Zero affected rows means another close, a rate change or a car removal
//! won; the rental is re-read and classified again.

use chrono::{DateTime, Utc};
use rentline_core::policy::{self, Actor, Relation};
use rentline_core::{fee, CoreError, Rental};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::{fetch_car, fetch_rental, rental_not_found, BookingEngine};
use crate::error::{DbError, DbResult};

/// Close attempts before a rental that keeps changing underneath is
/// reported as a store failure.
const MAX_CLOSE_ATTEMPTS: u32 = 3;

impl BookingEngine {
    /// Returns a rental on behalf of `actor`.
    ///
    /// ## Checks (in order)
    /// 1. `Domain(NotFound)` - no such rental
    /// 2. `Domain(Forbidden)` - actor is not the renter (the system actor passes)
    /// 3. `Domain(AlreadyClosed)` - returned before; nothing is written
    ///
    /// ## Returns
    /// The closed rental with `end_date = now` and the computed fee.
    pub async fn close_rental(&self, rental_id: &str, actor: &Actor) -> DbResult<Rental> {
        let mut conn = self.pool.acquire().await?;

        for attempt in 1..=MAX_CLOSE_ATTEMPTS {
            let rental = fetch_rental(&mut conn, rental_id)
                .await?
                .ok_or_else(|| rental_not_found(rental_id))?;

            policy::authorize(actor, &rental, Relation::Renter)?;

            if !rental.is_open() {
                return Err(CoreError::AlreadyClosed {
                    rental_id: rental.id,
                }
                .into());
            }

            let end = self.clock.now();
            if let Some(closed) = close_open_rental(&mut conn, &rental, end).await? {
                info!(
                    rental_id = %closed.id,
                    actor = %actor.id(),
                    fee_cents = closed.fee_cents.unwrap_or_default(),
                    "Rental closed"
                );
                return Ok(closed);
            }

            debug!(rental_id = %rental_id, attempt, "Rental changed while closing, re-reading");
        }

        Err(DbError::Internal(format!(
            "rental {rental_id} kept changing while being closed"
        )))
    }
}

/// Closes an open rental at `end` using its car's current rate.
///
/// Returns `Ok(None)` when the compare-and-set lost (rental already
/// closed, car gone or rate changed since the read). Inside a transaction
/// that holds the write lock this cannot happen.
pub(super) async fn close_open_rental(
    conn: &mut SqliteConnection,
    rental: &Rental,
    end: DateTime<Utc>,
) -> DbResult<Option<Rental>> {
    let car_id = rental.car_id.as_deref().ok_or_else(|| {
        DbError::Internal(format!("open rental {} has no car", rental.id))
    })?;

    let Some(car) = fetch_car(conn, car_id).await? else {
        return Ok(None);
    };

    let closure = fee::close(rental, end, car.daily_rate())?;

    let result = sqlx::query(
        r#"
        UPDATE rentals SET
            end_date = ?2,
            fee_cents = ?3
        WHERE id = ?1
          AND end_date IS NULL
          AND car_id = ?4
          AND EXISTS (SELECT 1 FROM cars WHERE id = ?4 AND daily_rate_cents = ?5)
        "#,
    )
    .bind(&rental.id)
    .bind(closure.end_date)
    .bind(closure.fee.cents())
    .bind(car_id)
    .bind(car.daily_rate_cents)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    debug!(
        rental_id = %rental.id,
        billable_days = closure.billable_days,
        daily_rate = %car.daily_rate(),
        fee = %closure.fee,
        "Close transition written"
    );

    Ok(Some(Rental {
        end_date: Some(closure.end_date),
        fee_cents: Some(closure.fee.cents()),
        ..rental.clone()
    }))
}
