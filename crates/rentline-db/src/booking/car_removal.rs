//! # Car Removal
//!
//! Deletes a car without losing its rental history.
//!
//! ## Sequence (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete_car(C, merchant M)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    UPDATE cars SET updated_at   ← takes the write lock first           │
//! │      └── no row?                → NotFound                             │
//! │    C.merchant_id != M?          → Forbidden (rolled back)              │
//! │    open rental on C?                                                    │
//! │      └── close it at C's current rate (system actor)                   │
//! │    UPDATE rentals SET car_id = NULL WHERE car_id = C                    │
//! │    DELETE FROM cars WHERE id = C                                        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A failure anywhere rolls everything back: the car is never gone        │
//! │  while its rental is still open.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rentline_core::policy::{self, Actor, Relation};
use rentline_core::{Car, Rental};
use tracing::{debug, info};

use super::lifecycle::close_open_rental;
use super::{car_not_found, fetch_car, open_rental_for_car, BookingEngine};
use crate::error::{DbError, DbResult};

/// What a car removal did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRemoval {
    /// The car as it was just before deletion.
    pub car: Car,

    /// The rental that was open on the car and got force-closed.
    pub closed_rental: Option<Rental>,

    /// Rentals (open or historical) whose `car_id` was set to NULL.
    pub detached_rentals: u64,
}

impl BookingEngine {
    /// Deletes a car on behalf of its owning merchant.
    ///
    /// ## Errors
    /// * `Domain(NotFound)` - no such car
    /// * `Domain(Forbidden)` - actor does not own the car
    pub async fn delete_car(&self, car_id: &str, actor: &Actor) -> DbResult<CarRemoval> {
        let now = self.clock.now();
        let mut tx = self.pool.begin().await?;

        // Writing first keeps every read below current for the whole unit.
        let touched = sqlx::query("UPDATE cars SET updated_at = ?2 WHERE id = ?1")
            .bind(car_id)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            return Err(car_not_found(car_id).into());
        }

        let car = fetch_car(&mut tx, car_id)
            .await?
            .ok_or_else(|| car_not_found(car_id))?;

        // Dropping the transaction on error rolls back the touch above.
        policy::authorize(actor, &car, Relation::CarOwner)?;

        let closed_rental = match open_rental_for_car(&mut tx, car_id).await? {
            Some(open) => {
                debug!(rental_id = %open.id, car_id = %car_id, "Force-closing open rental");
                let closed = close_open_rental(&mut tx, &open, now).await?.ok_or_else(|| {
                    DbError::Internal(format!("open rental {} could not be closed", open.id))
                })?;
                Some(closed)
            }
            None => None,
        };

        let detached_rentals = sqlx::query("UPDATE rentals SET car_id = NULL WHERE car_id = ?1")
            .bind(car_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM cars WHERE id = ?1")
            .bind(car_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            car_id = %car_id,
            actor = %actor.id(),
            closed_rental = closed_rental.as_ref().map(|r| r.id.as_str()).unwrap_or("none"),
            detached_rentals,
            "Car deleted"
        );

        Ok(CarRemoval {
            car,
            closed_rental,
            detached_rentals,
        })
    }
}
