//! # Rentline Service
//!
//! Operation facade for the car-rental booking backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Rentline Service                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Caller (routing layer, seed tool, tests)                       │   │
//! │  │  authenticate() ──► Session { actor } ──► command(&actor, ...)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  commands/                                                      │   │
//! │  │  account.rs  register, authenticate                             │   │
//! │  │  car.rs      create / update / delete / list cars               │   │
//! │  │  rental.rs   create / close / get / list rentals                │   │
//! │  │                                                                 │   │
//! │  │  role check ──► input validation ──► rentline-db                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  rentline-db: repositories + BookingEngine (SQLite)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use rentline_service::{init_tracing, RentalService, ServiceConfig};
//!
//! init_tracing();
//! let service = RentalService::connect(ServiceConfig::load()?).await?;
//! let session = service.authenticate("alice", "alice123").await?;
//! let rental = service.create_rental(&session.actor, request).await?;
//! ```

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod seed;
pub mod service;

pub use commands::account::{RegisterRequest, Session, UserDto};
pub use commands::car::{CarDto, CarRemovalDto, CreateCarRequest, UpdateCarRequest};
pub use commands::rental::{CreateRentalRequest, RentalDto};
pub use commands::ListRequest;
pub use config::{ConfigError, ServiceConfig};
pub use error::{ApiError, ApiResult, ErrorCategory, ErrorCode};
pub use service::RentalService;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - ERROR: Store failures hidden behind generic API errors
/// - WARN: Lost booking races, failed logins
/// - INFO: Rentals opened / closed, cars deleted
/// - DEBUG: Per-call detail
///
/// Set `RUST_LOG` to override, e.g. `RUST_LOG=rentline_db=trace`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rentline=debug,sqlx=warn"));

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
