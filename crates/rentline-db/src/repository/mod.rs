//! # Repository Module
//!
//! Plain reads and writes of the ledger tables.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service command                                                       │
//! │       │                                                                 │
//! │       │  db.cars().list_by_merchant(merchant_id, page)                 │
//! │       ▼                                                                 │
//! │  CarRepository                                                         │
//! │  ├── insert(&self, car)        → DuplicatePlate on plate clash         │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── update(&self, car)                                                │
//! │  └── list / list_by_merchant                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Transitions that must be atomic against concurrent callers           │
//! │  (open / close rental, delete car) live in `booking`, not here.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts
//! - [`CarRepository`](car::CarRepository) - Car listings
//! - [`RentalRepository`](rental::RentalRepository) - Rental reads and listings

pub mod car;
pub mod rental;
pub mod user;
