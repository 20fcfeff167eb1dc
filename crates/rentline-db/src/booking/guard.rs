//! # Availability Guard
//!
//! Opens a rental only while both the user and the car are free.
//!
//! ## Why Not Check-Then-Insert?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler A (user 1, car C)          Handler B (user 2, car C)          │
//! │  ─────────────────────────          ─────────────────────────          │
//! │  SELECT open rental for C → none                                       │
//! │                                     SELECT open rental for C → none    │
//! │  INSERT rental (1, C)                                                  │
//! │                                     INSERT rental (2, C)   ✗ two open  │
//! │                                                                         │
//! │  The reads below are only a fast path that fixes which rejection a     │
//! │  caller sees first (user before car). The INSERT is the decision:      │
//! │                                                                         │
//! │    ux_rentals_open_user  ON rentals(user_id) WHERE end_date IS NULL     │
//! │    ux_rentals_open_car   ON rentals(car_id)  WHERE end_date IS NULL     │
//! │                                                                         │
//! │  B's INSERT fails with "UNIQUE constraint failed: rentals.car_id",     │
//! │  which is translated to CarAlreadyRented { rental_id: A's rental }.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The merchant snapshot is taken by the same statement
//! (`INSERT … SELECT merchant_id FROM cars`), so a missing car and the
//! booking-time owner are both resolved atomically with the insert.

use chrono::{DateTime, Utc};
use rentline_core::{CoreError, Rental};
use sqlx::SqliteConnection;
use std::future::Future;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{car_not_found, open_rental_for_car, open_rental_for_user, BookingEngine};
use crate::error::{DbError, DbResult};

/// Insert attempts before the guard gives up on a conflict that keeps
/// disappearing before it can be reported.
pub const MAX_OPEN_ATTEMPTS: u32 = 3;

/// Result of one insert attempt.
#[derive(Debug)]
enum Attempt {
    Opened(Rental),
    Rejected(CoreError),
    /// The conflicting rental closed before it could be re-read.
    Vanished,
}

impl BookingEngine {
    /// Opens a rental of `car_id` for `user_id`.
    ///
    /// ## Returns
    /// * `Ok(Rental)` - open rental with `start_date = now`, merchant snapshot
    ///
    /// ## Errors
    /// * `Domain(UserAlreadyRenting { rental_id })` - the user holds an open rental
    /// * `Domain(CarAlreadyRented { rental_id })` - the car is rented
    /// * `Domain(NotFound)` - no such car
    /// * `Internal` - conflicts kept vanishing for [`MAX_OPEN_ATTEMPTS`] attempts
    ///
    /// A rejection is final for the request; the guard never waits for a
    /// car or user to become free.
    pub async fn try_open_rental(&self, user_id: &str, car_id: &str) -> DbResult<Rental> {
        let rental =
            open_with_retries(user_id, car_id, move || self.attempt_open(user_id, car_id)).await?;

        info!(
            rental_id = %rental.id,
            user_id = %user_id,
            car_id = %car_id,
            merchant_id = %rental.merchant_id,
            "Rental opened"
        );
        Ok(rental)
    }

    async fn attempt_open(&self, user_id: &str, car_id: &str) -> DbResult<Attempt> {
        let mut conn = self.pool.acquire().await?;

        // Fast path: fixes rejection precedence, decides nothing.
        if let Some(open) = open_rental_for_user(&mut conn, user_id).await? {
            return Ok(Attempt::Rejected(CoreError::UserAlreadyRenting {
                rental_id: open.id,
            }));
        }
        if let Some(open) = open_rental_for_car(&mut conn, car_id).await? {
            return Ok(Attempt::Rejected(CoreError::CarAlreadyRented {
                rental_id: open.id,
            }));
        }

        match insert_open_rental(&mut conn, user_id, car_id, self.clock.now()).await {
            Ok(Some(rental)) => Ok(Attempt::Opened(rental)),
            Ok(None) => Ok(Attempt::Rejected(car_not_found(car_id))),
            Err(err) => classify_conflict(&mut conn, err, user_id, car_id).await,
        }
    }
}

/// Drives `attempt` until it opens or rejects, at most [`MAX_OPEN_ATTEMPTS`] times.
async fn open_with_retries<F, Fut>(user_id: &str, car_id: &str, mut attempt: F) -> DbResult<Rental>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<Attempt>>,
{
    for round in 1..=MAX_OPEN_ATTEMPTS {
        debug!(user_id = %user_id, car_id = %car_id, attempt = round, "Trying to open rental");

        match attempt().await? {
            Attempt::Opened(rental) => return Ok(rental),
            Attempt::Rejected(rejection) => {
                debug!(user_id = %user_id, car_id = %car_id, reason = %rejection, "Rental rejected");
                return Err(rejection.into());
            }
            Attempt::Vanished => {
                warn!(
                    user_id = %user_id,
                    car_id = %car_id,
                    attempt = round,
                    "Conflicting rental closed before it could be reported, retrying"
                );
            }
        }
    }

    Err(DbError::Internal(format!(
        "could not open rental for user {user_id} on car {car_id} after {MAX_OPEN_ATTEMPTS} attempts"
    )))
}

/// The deciding statement. `Ok(None)` means the car does not exist.
async fn insert_open_rental(
    conn: &mut SqliteConnection,
    user_id: &str,
    car_id: &str,
    start_date: DateTime<Utc>,
) -> DbResult<Option<Rental>> {
    let rental = sqlx::query_as::<_, Rental>(
        r#"
        INSERT INTO rentals (id, user_id, car_id, merchant_id, start_date, end_date, fee_cents)
        SELECT ?1, ?2, id, merchant_id, ?3, NULL, NULL
        FROM cars
        WHERE id = ?4
        RETURNING id, user_id, car_id, merchant_id, start_date, end_date, fee_cents
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(start_date)
    .bind(car_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(rental)
}

/// Turns a failed insert into a rejection naming the open rental that
/// holds the violated index entry.
///
/// ```text
/// rentals.user_id violated ──► UserAlreadyRenting { holder }
/// rentals.car_id  violated ──► CarAlreadyRented   { holder }
/// holder closed meanwhile  ──► Vanished (retry)
/// anything else            ──► the error itself
/// ```
async fn classify_conflict(
    conn: &mut SqliteConnection,
    err: DbError,
    user_id: &str,
    car_id: &str,
) -> DbResult<Attempt> {
    let column = err.unique_column("rentals").map(str::to_owned);
    let conflict = match column.as_deref() {
        Some("user_id") => open_rental_for_user(conn, user_id)
            .await?
            .map(|open| CoreError::UserAlreadyRenting { rental_id: open.id }),
        Some("car_id") => open_rental_for_car(conn, car_id)
            .await?
            .map(|open| CoreError::CarAlreadyRented { rental_id: open.id }),
        _ => return Err(err),
    };

    match conflict {
        Some(rejection) => {
            warn!(
                user_id = %user_id,
                car_id = %car_id,
                conflicting_rental = rejection.conflicting_rental().unwrap_or_default(),
                "Concurrent booking lost the race"
            );
            Ok(Attempt::Rejected(rejection))
        }
        None => Ok(Attempt::Vanished),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use std::cell::Cell;

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
    }

    /// A merchant, two customers and two cars; no rentals.
    async fn ledger() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = day0();

        for (id, role) in [("m-1", "merchant"), ("u-1", "customer"), ("u-2", "customer")] {
            sqlx::query(
                "INSERT INTO users (id, username, password_hash, role, created_at) \
                 VALUES (?1, ?1, 'x', ?2, ?3)",
            )
            .bind(id)
            .bind(role)
            .bind(now)
            .execute(db.pool())
            .await
            .unwrap();
        }
        for (id, plate) in [("c-1", "CAR-1"), ("c-2", "CAR-2")] {
            sqlx::query(
                "INSERT INTO cars (id, merchant_id, model, plate, daily_rate_cents, created_at, updated_at) \
                 VALUES (?1, 'm-1', 'Toyota Corolla', ?2, 4000, ?3, ?3)",
            )
            .bind(id)
            .bind(plate)
            .bind(now)
            .execute(db.pool())
            .await
            .unwrap();
        }
        db
    }

    async fn open(conn: &mut SqliteConnection, user_id: &str, car_id: &str) -> Rental {
        insert_open_rental(conn, user_id, car_id, day0())
            .await
            .unwrap()
            .unwrap()
    }

    async fn close_directly(conn: &mut SqliteConnection, rental_id: &str) {
        sqlx::query("UPDATE rentals SET end_date = ?2, fee_cents = 4000 WHERE id = ?1")
            .bind(rental_id)
            .bind(day0())
            .execute(&mut *conn)
            .await
            .unwrap();
    }

    fn rejection(attempt: Attempt) -> CoreError {
        match attempt {
            Attempt::Rejected(err) => err,
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_user_index_violation_names_holder() {
        let db = ledger().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let holder = open(&mut conn, "u-1", "c-1").await;

        let err = insert_open_rental(&mut conn, "u-1", "c-2", day0())
            .await
            .unwrap_err();
        assert_eq!(err.unique_column("rentals"), Some("user_id"));

        let attempt = classify_conflict(&mut conn, err, "u-1", "c-2").await.unwrap();
        assert_eq!(
            rejection(attempt),
            CoreError::UserAlreadyRenting {
                rental_id: holder.id
            }
        );
    }

    #[tokio::test]
    async fn test_car_index_violation_names_holder() {
        let db = ledger().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let holder = open(&mut conn, "u-1", "c-1").await;

        let err = insert_open_rental(&mut conn, "u-2", "c-1", day0())
            .await
            .unwrap_err();
        assert_eq!(err.unique_column("rentals"), Some("car_id"));

        let attempt = classify_conflict(&mut conn, err, "u-2", "c-1").await.unwrap();
        assert_eq!(
            rejection(attempt),
            CoreError::CarAlreadyRented {
                rental_id: holder.id
            }
        );
    }

    #[tokio::test]
    async fn test_holder_closed_before_reread_is_vanished() {
        let db = ledger().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let holder = open(&mut conn, "u-1", "c-1").await;

        let err = insert_open_rental(&mut conn, "u-2", "c-1", day0())
            .await
            .unwrap_err();
        close_directly(&mut conn, &holder.id).await;

        let attempt = classify_conflict(&mut conn, err, "u-2", "c-1").await.unwrap();
        assert!(matches!(attempt, Attempt::Vanished));
    }

    #[tokio::test]
    async fn test_unrelated_error_passes_through() {
        let db = ledger().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = DbError::UniqueViolation {
            table: "cars".to_string(),
            column: "plate".to_string(),
        };
        let passed = classify_conflict(&mut conn, err, "u-1", "c-1").await.unwrap_err();
        assert_eq!(passed.unique_column("cars"), Some("plate"));
    }

    #[tokio::test]
    async fn test_missing_car_inserts_nothing() {
        let db = ledger().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let inserted = insert_open_rental(&mut conn, "u-1", "no-such-car", day0())
            .await
            .unwrap();
        assert!(inserted.is_none());
    }

    #[tokio::test]
    async fn test_retry_after_vanished_conflict_opens() {
        let db = ledger().await;
        let mut conn = db.pool().acquire().await.unwrap();
        let rental = open(&mut conn, "u-1", "c-1").await;

        let calls = Cell::new(0);
        let opened = open_with_retries("u-1", "c-1", || {
            calls.set(calls.get() + 1);
            let outcome = if calls.get() == 1 {
                Attempt::Vanished
            } else {
                Attempt::Opened(rental.clone())
            };
            async move { Ok(outcome) }
        })
        .await
        .unwrap();

        assert_eq!(opened, rental);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_conflict_that_keeps_vanishing_gives_up() {
        let calls = Cell::new(0);
        let err = open_with_retries("u-1", "c-1", || {
            calls.set(calls.get() + 1);
            async { Ok(Attempt::Vanished) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, DbError::Internal(_)));
        assert_eq!(calls.get(), MAX_OPEN_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_rejection_is_not_retried() {
        let calls = Cell::new(0);
        let err = open_with_retries("u-1", "c-1", || {
            calls.set(calls.get() + 1);
            async {
                Ok(Attempt::Rejected(CoreError::CarAlreadyRented {
                    rental_id: "r-9".to_string(),
                }))
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(CoreError::CarAlreadyRented { rental_id }) if rental_id == "r-9"
        ));
        assert_eq!(calls.get(), 1);
    }
}
