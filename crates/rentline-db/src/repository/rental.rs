//! # Rental Repository
//!
//! Reads of the rental ledger.
//!
//! Rentals are only ever written by the booking engine, which also owns
//! the open-rental lookups it needs inside its transactions. This
//! repository serves point reads and the listings.
//!
//! ## Listing Predicates
//! ```text
//! list_by_user(u)      WHERE user_id = u
//! list_by_merchant(m)  WHERE merchant_id = m   (booking-time owner, not
//!                                               the car's current owner)
//! ```

use rentline_core::{Page, PageRequest, Rental};
use sqlx::SqlitePool;

use crate::error::DbResult;

/// Repository for rental reads.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

impl RentalRepository {
    /// Creates a new RentalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    /// Gets a rental by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            SELECT id, user_id, car_id, merchant_id, start_date, end_date, fee_cents
            FROM rentals
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rental)
    }

    /// Lists a user's rentals, newest first.
    pub async fn list_by_user(&self, user_id: &str, request: PageRequest) -> DbResult<Page<Rental>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT id, user_id, car_id, merchant_id, start_date, end_date, fee_cents
            FROM rentals
            WHERE user_id = ?1
            ORDER BY start_date DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(user_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rentals, total.max(0) as u64, request))
    }

    /// Lists the rentals booked on a merchant's cars, newest first.
    pub async fn list_by_merchant(
        &self,
        merchant_id: &str,
        request: PageRequest,
    ) -> DbResult<Page<Rental>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM rentals WHERE merchant_id = ?1")
                .bind(merchant_id)
                .fetch_one(&self.pool)
                .await?;

        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT id, user_id, car_id, merchant_id, start_date, end_date, fee_cents
            FROM rentals
            WHERE merchant_id = ?1
            ORDER BY start_date DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(merchant_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rentals, total.max(0) as u64, request))
    }

    /// Counts rentals that are still open.
    pub async fn count_open(&self) -> DbResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals WHERE end_date IS NULL")
            .fetch_one(&self.pool)
            .await?;

        Ok(total.max(0) as u64)
    }
}
