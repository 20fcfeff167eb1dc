//! # Money Module
//!
//! Provides the `Money` type for daily rates and rental fees.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  float(45.50) * 3  is fine... until it is not:                          │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (cents)                              │
//! │    "45.50" ──parse──► 4550 cents ──× 3 days──► 13650 cents ──► "136.50" │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rentline_core::money::Money;
//!
//! let rate: Money = "45.50".parse().unwrap();
//! assert_eq!(rate.cents(), 4550);
//! assert_eq!(rate.multiply_days(3).unwrap().to_string(), "136.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Car.daily_rate ──► fee::compute_fee(start, end, rate) ──► Rental.fee
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use rentline_core::money::Money;
    ///
    /// let rate = Money::from_cents(4000); // 40.00
    /// assert_eq!(rate.cents(), 4000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies a daily rate by a number of billable days.
    ///
    /// Returns `None` when the product does not fit in `i64` cents.
    ///
    /// ## Example
    /// ```rust
    /// use rentline_core::money::Money;
    ///
    /// let rate = Money::from_cents(3825); // 38.25
    /// assert_eq!(rate.multiply_days(2).unwrap().cents(), 7650);
    /// assert!(Money::from_cents(i64::MAX).multiply_days(2).is_none());
    /// ```
    #[inline]
    pub const fn multiply_days(&self, days: i64) -> Option<Self> {
        match self.0.checked_mul(days) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Parses a decimal amount with at most two fractional digits.
    ///
    /// ## Accepted Forms
    /// `"40"`, `"40.5"`, `"40.50"`, `" 40.50 "`
    ///
    /// ## Rejected Forms
    /// `""`, `"-5"`, `"40.505"`, `"4o.00"`, `"1e3"`
    pub fn parse_amount(field: &str, input: &str) -> Result<Self, ValidationError> {
        let text = input.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Err(ValidationError::required(field));
        }

        let (major_text, minor_text) = match text.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (text, ""),
        };

        if major_text.is_empty() || !major_text.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must be a non-negative decimal amount"));
        }
        if minor_text.len() > 2 || !minor_text.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("must have at most two decimal places"));
        }

        let major: i64 = major_text
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        let minor: i64 = match minor_text.len() {
            0 => 0,
            1 => minor_text.parse::<i64>().map_err(|_| invalid("bad cents"))? * 10,
            _ => minor_text.parse().map_err(|_| invalid("bad cents"))?,
        };

        major
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(minor))
            .map(Money)
            .ok_or_else(|| invalid("amount is too large"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as a plain decimal with two places ("45.50").
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_amount("amount", s)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
