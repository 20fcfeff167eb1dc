//! # Car Commands
//!
//! Merchants list, edit and remove cars; anyone signed in can browse.
//!
//! ## Car Removal Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  delete_car(merchant M, car C)                                          │
//! │       │                                                                 │
//! │       ├── role != merchant       → FORBIDDEN                           │
//! │       ▼                                                                 │
//! │  BookingEngine::delete_car                                              │
//! │       ├── C missing              → NOT_FOUND                           │
//! │       ├── C not owned by M       → FORBIDDEN                           │
//! │       ▼                                                                 │
//! │  one transaction: close open rental at C's rate, detach history,       │
//! │  delete C                                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CarRemovalDto { closed_rental_id, closed_rental_fee, detached }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rentline_core::policy::{self, Actor, Relation};
use rentline_core::validation::{parse_daily_rate, validate_model, validate_plate};
use rentline_core::{Car, CarPatch, CoreError, Page, Role};
use rentline_db::CarRemoval;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::ListRequest;
use crate::error::ApiResult;
use crate::service::{principal_id, RentalService};

/// Input for listing a new car. The rate is decimal text, e.g. `"45.50"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCarRequest {
    pub model: Option<String>,
    pub plate: Option<String>,
    pub daily_rate: Option<String>,
}

impl CreateCarRequest {
    pub fn new(model: &str, plate: &str, daily_rate: &str) -> Self {
        CreateCarRequest {
            model: Some(model.to_string()),
            plate: Some(plate.to_string()),
            daily_rate: Some(daily_rate.to_string()),
        }
    }
}

/// Partial car update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCarRequest {
    pub model: Option<String>,
    pub plate: Option<String>,
    pub daily_rate: Option<String>,
}

impl UpdateCarRequest {
    fn into_patch(self) -> ApiResult<CarPatch> {
        Ok(CarPatch {
            model: self.model.as_deref().map(validate_model).transpose()?,
            plate: self.plate.as_deref().map(validate_plate).transpose()?,
            daily_rate: self.daily_rate.as_deref().map(parse_daily_rate).transpose()?,
        })
    }
}

/// Car DTO.
///
/// The rate is given both as display text and in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarDto {
    pub id: String,
    pub merchant_id: String,
    pub model: String,
    pub plate: String,
    pub daily_rate: String,
    pub daily_rate_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Car> for CarDto {
    fn from(c: Car) -> Self {
        CarDto {
            daily_rate: c.daily_rate().to_string(),
            daily_rate_cents: c.daily_rate_cents,
            id: c.id,
            merchant_id: c.merchant_id,
            model: c.model,
            plate: c.plate,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// What deleting a car did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarRemovalDto {
    pub car_id: String,
    /// Rental that was still open and got closed by the removal.
    pub closed_rental_id: Option<String>,
    pub closed_rental_fee: Option<String>,
    /// Rentals whose car reference was cleared.
    pub detached_rentals: u64,
}

impl From<CarRemoval> for CarRemovalDto {
    fn from(r: CarRemoval) -> Self {
        CarRemovalDto {
            car_id: r.car.id,
            closed_rental_fee: r
                .closed_rental
                .as_ref()
                .and_then(|rental| rental.fee())
                .map(|fee| fee.to_string()),
            closed_rental_id: r.closed_rental.map(|rental| rental.id),
            detached_rentals: r.detached_rentals,
        }
    }
}

impl RentalService {
    /// Lists a new car owned by the acting merchant.
    ///
    /// ## Errors
    /// * `FORBIDDEN` - actor is not a merchant
    /// * `MISSING_FIELDS` - model, plate or daily_rate absent
    /// * `VALIDATION_ERROR` - malformed plate, non-positive rate, ...
    /// * `DUPLICATE_PLATE` - another car has this plate
    pub async fn create_car(&self, actor: &Actor, request: CreateCarRequest) -> ApiResult<CarDto> {
        policy::require_role(actor, Role::Merchant, "create_car")?;
        let merchant_id = principal_id(actor, "create_car")?;

        let model = validate_model(request.model.as_deref().unwrap_or_default())?;
        let plate = validate_plate(request.plate.as_deref().unwrap_or_default())?;
        let daily_rate = parse_daily_rate(request.daily_rate.as_deref().unwrap_or_default())?;

        let now = self.booking.now();
        let car = Car {
            id: Uuid::new_v4().to_string(),
            merchant_id: merchant_id.to_string(),
            model,
            plate,
            daily_rate_cents: daily_rate.cents(),
            created_at: now,
            updated_at: now,
        };

        self.db.cars().insert(&car).await?;

        info!(car_id = %car.id, merchant_id = %car.merchant_id, plate = %car.plate, "Car created");

        Ok(car.into())
    }

    /// Updates a car owned by the acting merchant.
    ///
    /// A new rate applies to rentals closed from now on, including ones
    /// already open.
    ///
    /// ## Errors
    /// * `FORBIDDEN` - not a merchant, or not the owner
    /// * `NOT_FOUND` - no such car
    /// * `DUPLICATE_PLATE` - the new plate is taken
    pub async fn update_car(
        &self,
        actor: &Actor,
        car_id: &str,
        request: UpdateCarRequest,
    ) -> ApiResult<CarDto> {
        policy::require_role(actor, Role::Merchant, "update_car")?;

        let car = self
            .db
            .cars()
            .get_by_id(car_id)
            .await?
            .ok_or_else(|| CoreError::not_found("car", car_id))?;
        policy::authorize(actor, &car, Relation::CarOwner)?;

        let patch = request.into_patch()?;
        if patch.is_empty() {
            debug!(car_id = %car_id, "Empty car update");
            return Ok(car.into());
        }

        let updated = self
            .db
            .cars()
            .update(car_id, &car.merchant_id, &patch, self.booking.now())
            .await?;

        info!(
            car_id = %updated.id,
            daily_rate_cents = updated.daily_rate_cents,
            "Car updated"
        );

        Ok(updated.into())
    }

    /// Deletes a car owned by the acting merchant.
    ///
    /// An open rental on the car is closed first at the car's current rate;
    /// all its rentals stay in the ledger without a car reference.
    pub async fn delete_car(&self, actor: &Actor, car_id: &str) -> ApiResult<CarRemovalDto> {
        policy::require_role(actor, Role::Merchant, "delete_car")?;

        let removal = self.booking.delete_car(car_id, actor).await?;
        Ok(removal.into())
    }

    /// Lists all cars, newest first.
    pub async fn list_cars(&self, actor: &Actor, list: ListRequest) -> ApiResult<Page<CarDto>> {
        let request = self.page_request(list.page, list.per_page);
        debug!(actor = %actor.id(), page = request.page, "Listing cars");

        let page = self.db.cars().list(request).await?;
        Ok(page.map(CarDto::from))
    }

    /// Lists one merchant's cars, newest first. Open to every role.
    pub async fn list_merchant_cars(
        &self,
        actor: &Actor,
        merchant_id: &str,
        list: ListRequest,
    ) -> ApiResult<Page<CarDto>> {
        let request = self.page_request(list.page, list.per_page);
        debug!(actor = %actor.id(), merchant_id = %merchant_id, "Listing merchant cars");

        let page = self.db.cars().list_by_merchant(merchant_id, request).await?;
        Ok(page.map(CarDto::from))
    }
}
