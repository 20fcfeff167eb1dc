//! # rentline-db: Ledger Store and Booking Engine
//!
//! SQLite storage for users, cars and rentals, plus the booking
//! transitions whose correctness depends on the store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rentline Data Flow                               │
//! │                                                                         │
//! │  RentalService::create_rental / close_rental / delete_car              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   rentline-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌──────────────────┐   │   │
//! │  │   │   Database    │  │ Repositories  │  │  BookingEngine   │   │   │
//! │  │   │   (pool.rs)   │  │ UserRepo      │  │  guard           │   │   │
//! │  │   │ SqlitePool    │◄─│ CarRepo       │  │  lifecycle       │   │   │
//! │  │   │ WAL, FKs on   │  │ RentalRepo    │  │  car_removal     │   │   │
//! │  │   └───────────────┘  └───────────────┘  └──────────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (migrations/sqlite): partial unique indexes, CHECKs, triggers  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Plain reads and writes
//! - [`booking`] - Open, close and car removal transitions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rentline_core::{Actor, Role};
//! use rentline_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./rentline.db")).await?;
//!
//! let rental = db.booking().try_open_rental(&user_id, &car_id).await?;
//! let actor = Actor::principal(&user_id, Role::Customer);
//! let closed = db.booking().close_rental(&rental.id, &actor).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use booking::{BookingEngine, CarRemoval};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::car::CarRepository;
pub use repository::rental::RentalRepository;
pub use repository::user::UserRepository;
