//! # Car Repository
//!
//! Database operations for car listings.
//!
//! Deleting a car is not offered here: it has to close and detach the
//! car's rentals in the same transaction, see `booking::car_removal`.

use chrono::{DateTime, Utc};
use rentline_core::{Car, CarPatch, CoreError, Page, PageRequest};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for car database operations.
#[derive(Debug, Clone)]
pub struct CarRepository {
    pool: SqlitePool,
}

/// Maps a plate clash onto `DuplicatePlate`.
fn plate_conflict(err: DbError, plate: &str) -> DbError {
    if err.unique_column("cars") == Some("plate") {
        CoreError::DuplicatePlate {
            plate: plate.to_string(),
        }
        .into()
    } else {
        err
    }
}

impl CarRepository {
    /// Creates a new CarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarRepository { pool }
    }

    /// Inserts a new car.
    ///
    /// ## Errors
    /// * `Domain(DuplicatePlate)` - another car carries the plate
    /// * `ForeignKeyViolation` - the merchant does not exist
    pub async fn insert(&self, car: &Car) -> DbResult<()> {
        debug!(car_id = %car.id, merchant_id = %car.merchant_id, plate = %car.plate, "Inserting car");

        sqlx::query(
            r#"
            INSERT INTO cars (
                id, merchant_id, model, plate, daily_rate_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&car.id)
        .bind(&car.merchant_id)
        .bind(&car.model)
        .bind(&car.plate)
        .bind(car.daily_rate_cents)
        .bind(car.created_at)
        .bind(car.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| plate_conflict(e.into(), &car.plate))?;

        Ok(())
    }

    /// Gets a car by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, merchant_id, model, plate, daily_rate_cents, created_at, updated_at
            FROM cars
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(car)
    }

    /// Applies a partial update to a car owned by `merchant_id` and returns
    /// the stored row.
    ///
    /// Only the fields present in the patch are written, in one statement:
    ///
    /// ```text
    /// Owner A: { model: "New" }          Owner A: { daily_rate: 99.00 }
    ///      │                                  │
    ///      ▼                                  ▼
    /// model = COALESCE(?, model)         daily_rate = COALESCE(?, daily_rate)
    ///
    /// Both land; neither writes back a stale copy of the other's field.
    /// ```
    ///
    /// The owner is part of the filter, so a car that changed hands or
    /// vanished since it was read is reported as not found.
    ///
    /// ## Errors
    /// * `Domain(NotFound)` - no such car for this merchant
    /// * `Domain(DuplicatePlate)` - the new plate is taken
    pub async fn update(
        &self,
        car_id: &str,
        merchant_id: &str,
        patch: &CarPatch,
        updated_at: DateTime<Utc>,
    ) -> DbResult<Car> {
        debug!(car_id = %car_id, "Updating car");

        let car = sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars SET
                model = COALESCE(?3, model),
                plate = COALESCE(?4, plate),
                daily_rate_cents = COALESCE(?5, daily_rate_cents),
                updated_at = ?6
            WHERE id = ?1 AND merchant_id = ?2
            RETURNING id, merchant_id, model, plate, daily_rate_cents, created_at, updated_at
            "#,
        )
        .bind(car_id)
        .bind(merchant_id)
        .bind(patch.model.as_deref())
        .bind(patch.plate.as_deref())
        .bind(patch.daily_rate_cents())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| plate_conflict(e.into(), patch.plate.as_deref().unwrap_or_default()))?;

        car.ok_or_else(|| CoreError::not_found("car", car_id).into())
    }

    /// Lists all cars, newest first.
    pub async fn list(&self, request: PageRequest) -> DbResult<Page<Car>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;

        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, merchant_id, model, plate, daily_rate_cents, created_at, updated_at
            FROM cars
            ORDER BY created_at DESC, id DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(cars, total.max(0) as u64, request))
    }

    /// Lists the cars owned by one merchant, newest first.
    pub async fn list_by_merchant(
        &self,
        merchant_id: &str,
        request: PageRequest,
    ) -> DbResult<Page<Car>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars WHERE merchant_id = ?1")
            .bind(merchant_id)
            .fetch_one(&self.pool)
            .await?;

        let cars = sqlx::query_as::<_, Car>(
            r#"
            SELECT id, merchant_id, model, plate, daily_rate_cents, created_at, updated_at
            FROM cars
            WHERE merchant_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(merchant_id)
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        debug!(merchant_id = %merchant_id, count = cars.len(), "Listed merchant cars");
        Ok(Page::new(cars, total.max(0) as u64, request))
    }
}
