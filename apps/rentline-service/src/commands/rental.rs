//! # Rental Commands
//!
//! Booking, returning and reading rentals.
//!
//! ## Booking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_rental(customer U, car C)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BookingEngine::try_open_rental(U, C)                                   │
//! │       │                                                                 │
//! │       ├── U has an open rental R  → USER_ALREADY_RENTING, rental_id R   │
//! │       ├── C has an open rental R  → CAR_ALREADY_RENTED,   rental_id R   │
//! │       ├── C missing               → NOT_FOUND                          │
//! │       ▼                                                                 │
//! │  RentalDto { id, start_date, status: open }                            │
//! │                                                                         │
//! │  close_rental(U, R)                                                    │
//! │       ├── R missing / not U's / closed → NOT_FOUND / FORBIDDEN /       │
//! │       │                                  ALREADY_CLOSED                │
//! │       ▼                                                                 │
//! │  RentalDto { end_date, fee: "80.00", status: closed }                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rentline_core::policy::{self, Actor, Relation};
use rentline_core::{CoreError, Page, Rental, RentalStatus, Role, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ListRequest;
use crate::error::ApiResult;
use crate::service::{principal_id, RentalService};

/// Booking input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRentalRequest {
    pub car_id: Option<String>,
}

impl CreateRentalRequest {
    pub fn new(car_id: &str) -> Self {
        CreateRentalRequest {
            car_id: Some(car_id.to_string()),
        }
    }
}

/// Rental DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentalDto {
    pub id: String,
    pub user_id: String,
    /// `None` once the car has been deleted.
    pub car_id: Option<String>,
    pub merchant_id: String,
    pub status: RentalStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub fee: Option<String>,
    pub fee_cents: Option<i64>,
}

impl From<Rental> for RentalDto {
    fn from(r: Rental) -> Self {
        RentalDto {
            status: r.status(),
            fee: r.fee().map(|fee| fee.to_string()),
            fee_cents: r.fee_cents,
            id: r.id,
            user_id: r.user_id,
            car_id: r.car_id,
            merchant_id: r.merchant_id,
            start_date: r.start_date,
            end_date: r.end_date,
        }
    }
}

impl RentalService {
    /// Books a car for the acting customer.
    ///
    /// ## Errors
    /// * `FORBIDDEN` - actor is not a customer
    /// * `MISSING_FIELDS` - no car_id
    /// * `USER_ALREADY_RENTING` / `CAR_ALREADY_RENTED` - with the blocking
    ///   rental in `rental_id`
    /// * `NOT_FOUND` - no such car
    pub async fn create_rental(
        &self,
        actor: &Actor,
        request: CreateRentalRequest,
    ) -> ApiResult<RentalDto> {
        policy::require_role(actor, Role::Customer, "create_rental")?;
        let user_id = principal_id(actor, "create_rental")?;

        let car_id = request
            .car_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ValidationError::required("car_id"))?;

        let rental = self.booking.try_open_rental(user_id, car_id).await?;
        Ok(rental.into())
    }

    /// Returns a rental on behalf of its renter and computes the fee.
    ///
    /// ## Errors
    /// * `FORBIDDEN` - actor is not a customer, or not the renter
    /// * `NOT_FOUND` - no such rental
    /// * `ALREADY_CLOSED` - returned before; the first fee stands
    pub async fn close_rental(&self, actor: &Actor, rental_id: &str) -> ApiResult<RentalDto> {
        policy::require_role(actor, Role::Customer, "close_rental")?;

        let rental = self.booking.close_rental(rental_id, actor).await?;
        Ok(rental.into())
    }

    /// Reads one rental. Visible to its renter and to the merchant who
    /// owned the car when it was booked.
    pub async fn get_rental(&self, actor: &Actor, rental_id: &str) -> ApiResult<RentalDto> {
        let rental = self
            .db
            .rentals()
            .get_by_id(rental_id)
            .await?
            .ok_or_else(|| CoreError::not_found("rental", rental_id))?;

        policy::authorize_any(actor, &rental, &[Relation::Renter, Relation::RentalMerchant])?;

        Ok(rental.into())
    }

    /// Lists a customer's rentals, newest first. Customers see only their own.
    pub async fn list_user_rentals(
        &self,
        actor: &Actor,
        user_id: &str,
        list: ListRequest,
    ) -> ApiResult<Page<RentalDto>> {
        policy::require_role(actor, Role::Customer, "list_user_rentals")?;
        if !actor.is_system() && actor.id() != user_id {
            return Err(CoreError::Forbidden {
                actor_id: actor.id().to_string(),
                resource: "user",
                resource_id: user_id.to_string(),
            }
            .into());
        }

        let request = self.page_request(list.page, list.per_page);
        debug!(user_id = %user_id, page = request.page, "Listing user rentals");

        let page = self.db.rentals().list_by_user(user_id, request).await?;
        Ok(page.map(RentalDto::from))
    }

    /// Lists the rentals booked on the acting merchant's cars, including
    /// rentals whose car has since been deleted.
    pub async fn list_merchant_rentals(
        &self,
        actor: &Actor,
        list: ListRequest,
    ) -> ApiResult<Page<RentalDto>> {
        policy::require_role(actor, Role::Merchant, "list_merchant_rentals")?;
        let merchant_id = principal_id(actor, "list_merchant_rentals")?;

        let request = self.page_request(list.page, list.per_page);
        debug!(merchant_id = %merchant_id, page = request.page, "Listing merchant rentals");

        let page = self.db.rentals().list_by_merchant(merchant_id, request).await?;
        Ok(page.map(RentalDto::from))
    }
}
