//! # Service Commands
//!
//! Every operation a caller can invoke, grouped by resource.
//!
//! ## Available Commands
//!
//! ### Account Commands
//! - `register` - Create a customer or merchant account
//! - `authenticate` - Check a username / password pair
//!
//! ### Car Commands
//! - `create_car` - List a new car (merchant)
//! - `update_car` - Change model, plate or rate (owning merchant)
//! - `delete_car` - Remove a car, closing its open rental (owning merchant)
//! - `list_cars` - All cars, paginated
//! - `list_merchant_cars` - One merchant's cars, paginated
//!
//! ### Rental Commands
//! - `create_rental` - Book a car (customer)
//! - `close_rental` - Return a car and compute the fee (renter)
//! - `get_rental` - One rental (renter or booking-time merchant)
//! - `list_user_rentals` - A customer's own rentals
//! - `list_merchant_rentals` - Rentals booked on the merchant's cars
//!
//! Each command takes the acting [`Actor`](rentline_core::Actor) first,
//! applies the role check, validates input and only then touches the store.

pub mod account;
pub mod car;
pub mod rental;

use serde::Deserialize;

/// Paging parameters of a listing call. Missing values take the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListRequest {
    pub fn page(page: u32, per_page: u32) -> Self {
        ListRequest {
            page: Some(page),
            per_page: Some(per_page),
        }
    }
}
