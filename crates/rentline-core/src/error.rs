//! # Error Types
//!
//! Domain-specific error types for rentline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rentline-core errors (this file)                                      │
//! │  ├── CoreError        - Booking rejections and domain failures         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rentline-db errors (separate crate)                                   │
//! │  └── DbError          - Store failures, wraps CoreError                │
//! │                                                                         │
//! │  rentline-service errors                                               │
//! │  └── ApiError         - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rejection carries the detail a caller needs to react without a
//! second query (the conflicting rental id, the offending plate, ...).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors produced by the booking rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The acting principal is not entitled to touch this resource.
    ///
    /// ## When This Occurs
    /// - A customer returns somebody else's rental
    /// - A merchant edits or deletes a car owned by another merchant
    /// - The actor's role does not allow the operation at all
    #[error("{actor_id} may not access {resource} {resource_id}")]
    Forbidden {
        actor_id: String,
        resource: &'static str,
        resource_id: String,
    },

    /// The user already holds an open rental (one active rental per user).
    #[error("User already has an active rental: {rental_id}")]
    UserAlreadyRenting { rental_id: String },

    /// The car is currently rented by someone (one active renter per car).
    #[error("Car is already rented: {rental_id}")]
    CarAlreadyRented { rental_id: String },

    /// The rental has already been returned.
    ///
    /// ## User Workflow
    /// ```text
    /// PUT return (rental R)  ──► Closed, fee 40.00
    /// PUT return (rental R)  ──► AlreadyClosed { rental_id: R }
    ///                            (first end_date / fee untouched)
    /// ```
    #[error("Rental already closed: {rental_id}")]
    AlreadyClosed { rental_id: String },

    /// Username is registered already.
    #[error("Username '{username}' is taken")]
    UsernameTaken { username: String },

    /// Another car carries this plate.
    #[error("Plate '{plate}' already exists")]
    DuplicatePlate { plate: String },

    /// The fee for a rental does not fit in the money type.
    ///
    /// Unreachable for rates within `MAX_DAILY_RATE_CENTS`; the rental
    /// stays open and nothing is written.
    #[error("Fee for rental {rental_id} is out of range")]
    FeeOverflow { rental_id: String },

    /// Username/password pair does not match a registered user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for an entity kind and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns the conflicting rental id for booking conflicts.
    pub fn conflicting_rental(&self) -> Option<&str> {
        match self {
            CoreError::UserAlreadyRenting { rental_id }
            | CoreError::CarAlreadyRented { rental_id }
            | CoreError::AlreadyClosed { rental_id } => Some(rental_id),
            _ => None,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before anything reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value exceeds its upper bound.
    #[error("{field} must not exceed {max}")]
    TooLarge { field: String, max: String },

    /// Invalid format (e.g., invalid UUID, malformed amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for a missing field.
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
