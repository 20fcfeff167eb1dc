//! # rentline-core: Pure Booking Rules for Rentline
//!
//! This crate holds every rule of the rental booking engine that can be
//! expressed without touching storage: the domain types, money, the fee
//! rule, input validation and the ownership policy.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rentline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 rentline-service (operation facade)             │   │
//! │  │    register, create_car, create_rental, close_rental, ...      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rentline-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ │   │
//! │  │   │  types  │ │  money  │ │   fee   │ │validation│ │ policy │ │   │
//! │  │   │  User   │ │  Money  │ │billable │ │  rules   │ │ Actor  │ │   │
//! │  │   │  Car    │ │         │ │  days   │ │  checks  │ │Relation│ │   │
//! │  │   │ Rental  │ │         │ │         │ │          │ │        │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └──────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              rentline-db (Ledger Store + Booking Engine)        │   │
//! │  │        SQLite, partial unique indexes, transactions             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Car, Rental, Role)
//! - [`money`] - Money type with integer arithmetic
//! - [`fee`] - Billable day counting and the close transition
//! - [`policy`] - Role and ownership checks
//! - [`validation`] - Input validation
//! - [`pagination`] - Page requests and pages
//! - [`clock`] - Time source used by the booking engine
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use rentline_core::fee::compute_fee;
//! use rentline_core::Money;
//!
//! let rate = Money::from_cents(4000); // 40.00 per day
//! let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
//!
//! // A same-day return is still billed one day
//! let fee = compute_fee(start, start + Duration::hours(14), rate).unwrap();
//! assert_eq!(fee.cents(), 4000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod fee;
pub mod money;
pub mod pagination;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pagination::{Page, PageRequest};
pub use policy::{Actor, Relation};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum number of days charged for any closed rental.
///
/// ## Business Reason
/// Short rentals are never free: a car returned minutes after pickup
/// still costs one daily rate.
pub const MIN_BILLABLE_DAYS: i64 = 1;

/// Highest daily rate a car may carry (1,000,000.00).
///
/// Keeps every fee representable: even the longest span `chrono` can
/// express, billed at this rate, fits in `i64` cents.
pub const MAX_DAILY_RATE_CENTS: i64 = 100_000_000;

/// Default number of items per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;
