//! # Booking Engine
//!
//! The three transitions that touch rental state:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Booking Engine                                  │
//! │                                                                         │
//! │  guard.rs        try_open_rental(user, car)                            │
//! │                  └── INSERT … SELECT FROM cars, decided by the partial │
//! │                      unique indexes on open rentals                    │
//! │                                                                         │
//! │  lifecycle.rs    close_rental(rental, actor)                           │
//! │                  └── Open ──► Closed  (end_date + fee in one UPDATE)   │
//! │                                                                         │
//! │  car_removal.rs  delete_car(car, actor)                                │
//! │                  └── BEGIN                                             │
//! │                        force-close open rental (system actor)          │
//! │                        UPDATE rentals SET car_id = NULL                │
//! │                        DELETE FROM cars                                │
//! │                      COMMIT                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Time comes from the engine's [`Clock`], so start dates, end dates and
//! fees are reproducible in tests.

mod car_removal;
mod guard;
mod lifecycle;

pub use car_removal::CarRemoval;
pub use guard::MAX_OPEN_ATTEMPTS;

use rentline_core::{Car, Clock, CoreError, Rental};
use sqlx::{SqliteConnection, SqlitePool};
use std::fmt;
use std::sync::Arc;

use crate::error::DbResult;

/// Runs the booking transitions against the ledger.
#[derive(Clone)]
pub struct BookingEngine {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl BookingEngine {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        BookingEngine { pool, clock }
    }

    /// The engine's notion of "now".
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}

impl fmt::Debug for BookingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingEngine")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Shared Lookups
// =============================================================================
// Usable on a pooled connection or inside a transaction.

async fn fetch_rental(conn: &mut SqliteConnection, rental_id: &str) -> DbResult<Option<Rental>> {
    let rental = sqlx::query_as::<_, Rental>(
        r#"
        SELECT id, user_id, car_id, merchant_id, start_date, end_date, fee_cents
        FROM rentals
        WHERE id = ?1
        "#,
    )
    .bind(rental_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(rental)
}

async fn fetch_car(conn: &mut SqliteConnection, car_id: &str) -> DbResult<Option<Car>> {
    let car = sqlx::query_as::<_, Car>(
        r#"
        SELECT id, merchant_id, model, plate, daily_rate_cents, created_at, updated_at
        FROM cars
        WHERE id = ?1
        "#,
    )
    .bind(car_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(car)
}

async fn open_rental_for_user(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> DbResult<Option<Rental>> {
    let rental = sqlx::query_as::<_, Rental>(
        r#"
        SELECT id, user_id, car_id, merchant_id, start_date, end_date, fee_cents
        FROM rentals
        WHERE user_id = ?1 AND end_date IS NULL
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(rental)
}

async fn open_rental_for_car(
    conn: &mut SqliteConnection,
    car_id: &str,
) -> DbResult<Option<Rental>> {
    let rental = sqlx::query_as::<_, Rental>(
        r#"
        SELECT id, user_id, car_id, merchant_id, start_date, end_date, fee_cents
        FROM rentals
        WHERE car_id = ?1 AND end_date IS NULL
        "#,
    )
    .bind(car_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(rental)
}

fn rental_not_found(rental_id: &str) -> CoreError {
    CoreError::not_found("rental", rental_id)
}

fn car_not_found(car_id: &str) -> CoreError {
    CoreError::not_found("car", car_id)
}
