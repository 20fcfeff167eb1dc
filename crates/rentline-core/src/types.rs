//! # Domain Types
//!
//! Core domain types used throughout Rentline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │      User       │   │       Car       │   │       Rental         │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  id (UUID)      │◄──│  merchant_id    │   │  user_id   (renter)  │  │
//! │  │  username (uniq)│   │  plate (uniq)   │◄──│  car_id    (nullable)│  │
//! │  │  password_hash  │   │  model          │   │  merchant_id (snap)  │  │
//! │  │  role           │   │  daily_rate     │   │  start/end, fee      │  │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────────┘  │
//! │                                                                         │
//! │  A Rental is owned by neither User nor Car: it outlives the Car and    │
//! │  keeps the booking-time merchant as a snapshot.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// What a registered user is allowed to do. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books and returns rentals.
    Customer,
    /// Owns and manages cars.
    Merchant,
}

impl Role {
    /// Stored / wire name of the role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Merchant => "merchant",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name, unique across all users.
    pub username: String,

    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: Role,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Car
// =============================================================================

/// A car listed by a merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Car {
    pub id: String,

    /// Owning merchant. Only this user may edit or delete the car.
    pub merchant_id: String,

    /// Display label, e.g. "Toyota Corolla".
    pub model: String,

    /// Registration plate, unique across all cars.
    pub plate: String,

    /// Daily rate in cents. Always positive.
    pub daily_rate_cents: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Returns the daily rate as Money.
    #[inline]
    pub fn daily_rate(&self) -> Money {
        Money::from_cents(self.daily_rate_cents)
    }
}

/// Partial update of a car. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarPatch {
    pub model: Option<String>,
    pub plate: Option<String>,
    pub daily_rate: Option<Money>,
}

impl CarPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.plate.is_none() && self.daily_rate.is_none()
    }

    /// The new rate in cents, if the patch sets one.
    pub fn daily_rate_cents(&self) -> Option<i64> {
        self.daily_rate.map(|rate| rate.cents())
    }
}

// =============================================================================
// Rental
// =============================================================================

/// Lifecycle state of a rental. Closed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    /// `end_date` and `fee` are both unset.
    Open,
    /// `end_date` and `fee` are both set and never change again.
    Closed,
}

/// One booking of one car by one customer.
///
/// Uses the snapshot pattern for `merchant_id`: it is copied from the car
/// at booking time and does not follow later changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Rental {
    pub id: String,

    /// The renter. Immutable.
    pub user_id: String,

    /// The rented car, or `None` once the car has been deleted.
    pub car_id: Option<String>,

    /// Car owner at booking time (frozen).
    pub merchant_id: String,

    pub start_date: DateTime<Utc>,

    /// Set exactly once, when the rental closes.
    pub end_date: Option<DateTime<Utc>>,

    /// Fee in cents, derived at close time.
    pub fee_cents: Option<i64>,
}

impl Rental {
    /// Returns the lifecycle state.
    pub fn status(&self) -> RentalStatus {
        if self.end_date.is_some() {
            RentalStatus::Closed
        } else {
            RentalStatus::Open
        }
    }

    /// True while the car has not been returned.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// Returns the fee as Money once closed.
    #[inline]
    pub fn fee(&self) -> Option<Money> {
        self.fee_cents.map(Money::from_cents)
    }
}

/// The values written by the close transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Closure {
    pub end_date: DateTime<Utc>,
    pub fee: Money,
    pub billable_days: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
