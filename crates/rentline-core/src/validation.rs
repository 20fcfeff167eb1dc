//! # Validation Module
//!
//! Input validation for registration and car listings.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service command (rentline-service)                           │
//! │  ├── Missing fields, role names, decimal rates                         │
//! │  └── THIS MODULE: field rules, no store access                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── UNIQUE username / plate                                           │
//! │  ├── CHECK 0 < daily_rate_cents <= 1,000,000.00, end_date ⇔ fee        │
//! │  └── Partial unique indexes on open rentals                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rentline_core::validation::{parse_role, validate_plate};
//! use rentline_core::Role;
//!
//! validate_plate("ABC-1001").unwrap();
//! assert_eq!(parse_role(Some("user")).unwrap(), Role::Customer);
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Role;
use crate::MAX_DAILY_RATE_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const USERNAME_MAX: usize = 64;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 128;
const MODEL_MAX: usize = 100;
const PLATE_MAX: usize = 16;

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a username and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - No whitespace inside the name
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }
    if username.chars().count() > USERNAME_MAX {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: USERNAME_MAX,
        });
    }
    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(username.to_string())
}

/// Validates a password. Passwords are not trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    let len = password.chars().count();
    if len < PASSWORD_MIN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: PASSWORD_MIN,
        });
    }
    if len > PASSWORD_MAX {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: PASSWORD_MAX,
        });
    }

    Ok(())
}

/// Parses a role name.
///
/// A missing role registers a customer. `"user"` is accepted as an older
/// name for the customer role.
///
/// ## Example
/// ```rust
/// use rentline_core::validation::parse_role;
/// use rentline_core::Role;
///
/// assert_eq!(parse_role(None).unwrap(), Role::Customer);
/// assert_eq!(parse_role(Some("Merchant")).unwrap(), Role::Merchant);
/// assert!(parse_role(Some("admin")).is_err());
/// ```
pub fn parse_role(role: Option<&str>) -> ValidationResult<Role> {
    let Some(raw) = role.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Role::default());
    };

    match raw.to_ascii_lowercase().as_str() {
        "customer" | "user" => Ok(Role::Customer),
        "merchant" => Ok(Role::Merchant),
        _ => Err(ValidationError::NotAllowed {
            field: "role".to_string(),
            allowed: vec!["customer".to_string(), "merchant".to_string()],
        }),
    }
}

// =============================================================================
// Car Validators
// =============================================================================

/// Validates a car model label and returns it trimmed.
pub fn validate_model(model: &str) -> ValidationResult<String> {
    let model = model.trim();

    if model.is_empty() {
        return Err(ValidationError::required("model"));
    }
    if model.chars().count() > MODEL_MAX {
        return Err(ValidationError::TooLong {
            field: "model".to_string(),
            max: MODEL_MAX,
        });
    }

    Ok(model.to_string())
}

/// Validates a registration plate and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 16 characters
/// - Letters, digits, hyphens and single spaces only
///
/// Plates are compared exactly as given; no case folding happens here.
pub fn validate_plate(plate: &str) -> ValidationResult<String> {
    let plate = plate.trim();

    if plate.is_empty() {
        return Err(ValidationError::required("plate"));
    }
    if plate.chars().count() > PLATE_MAX {
        return Err(ValidationError::TooLong {
            field: "plate".to_string(),
            max: PLATE_MAX,
        });
    }
    if !plate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "plate".to_string(),
            reason: "only letters, digits, hyphens and spaces allowed".to_string(),
        });
    }

    Ok(plate.to_string())
}

/// Parses and validates a daily rate given as decimal text.
///
/// ## Example
/// ```rust
/// use rentline_core::validation::parse_daily_rate;
///
/// assert_eq!(parse_daily_rate("40").unwrap().cents(), 4000);
/// assert!(parse_daily_rate("0.00").is_err());
/// ```
pub fn parse_daily_rate(input: &str) -> ValidationResult<Money> {
    let rate = Money::parse_amount("daily_rate", input)?;
    validate_daily_rate(rate)?;
    Ok(rate)
}

/// A daily rate must be strictly positive and at most
/// [`MAX_DAILY_RATE_CENTS`].
pub fn validate_daily_rate(rate: Money) -> ValidationResult<()> {
    if !rate.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "daily_rate".to_string(),
        });
    }
    if rate.cents() > MAX_DAILY_RATE_CENTS {
        return Err(ValidationError::TooLarge {
            field: "daily_rate".to_string(),
            max: Money::from_cents(MAX_DAILY_RATE_CENTS).to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
