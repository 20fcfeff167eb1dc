//! # API Error Type
//!
//! Unified error type for service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Rentline                               │
//! │                                                                         │
//! │  service.create_rental(&actor, request)                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function  →  ApiResult<T>                               │  │
//! │  │         │                                                        │  │
//! │  │  ValidationError ─── Required ───────────► MISSING_FIELDS        │  │
//! │  │         │        └── role NotAllowed ────► INVALID_ROLE          │  │
//! │  │         ▼                                                        │  │
//! │  │  CoreError ──── CarAlreadyRented{r} ─────► CAR_ALREADY_RENTED    │  │
//! │  │         │                                   + rental_id = r      │  │
//! │  │         ▼                                                        │  │
//! │  │  DbError ────── QueryFailed / Internal ──► DATABASE_ERROR        │  │
//! │  │                 (logged, generic message)                        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! {
//!   "code": "CAR_ALREADY_RENTED",
//!   "message": "Car is already rented: 4b1c...",
//!   "rental_id": "4b1c..."
//! }
//! ```

use rentline_core::{CoreError, ValidationError};
use rentline_db::DbError;
use serde::Serialize;

/// Error returned from every service operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// The conflicting or already-closed rental, for booking rejections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_id: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// A required field is missing or empty (400)
    MissingFields,

    /// Unknown role at registration (400)
    InvalidRole,

    /// Username already registered (409)
    UsernameTaken,

    /// Plate already used by another car (409)
    DuplicatePlate,

    /// The user already holds an open rental (409)
    UserAlreadyRenting,

    /// The car is already rented (409)
    CarAlreadyRented,

    /// The rental was returned before (409)
    AlreadyClosed,

    /// Role or ownership check failed (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Username / password mismatch (401)
    InvalidCredentials,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Conflict,
    Forbidden,
    NotFound,
    AlreadyClosed,
    Unauthenticated,
    Internal,
}

impl ErrorCode {
    pub const fn category(self) -> ErrorCategory {
        match self {
            ErrorCode::ValidationError | ErrorCode::MissingFields | ErrorCode::InvalidRole => {
                ErrorCategory::Validation
            }
            ErrorCode::UsernameTaken
            | ErrorCode::DuplicatePlate
            | ErrorCode::UserAlreadyRenting
            | ErrorCode::CarAlreadyRented => ErrorCategory::Conflict,
            ErrorCode::AlreadyClosed => ErrorCategory::AlreadyClosed,
            ErrorCode::Forbidden => ErrorCategory::Forbidden,
            ErrorCode::NotFound => ErrorCategory::NotFound,
            ErrorCode::InvalidCredentials => ErrorCategory::Unauthenticated,
            ErrorCode::DatabaseError | ErrorCode::Internal => ErrorCategory::Internal,
        }
    }

    /// Whether the same request may succeed when sent again unchanged.
    ///
    /// Booking conflicts clear once the blocking rental is returned; store
    /// failures may be transient. Everything else needs different input.
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorCode::UserAlreadyRenting
                | ErrorCode::CarAlreadyRented
                | ErrorCode::DatabaseError
        )
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            rental_id: None,
        }
    }

    /// Attaches the rental a rejection refers to.
    pub fn with_rental(mut self, rental_id: impl Into<String>) -> Self {
        self.rental_id = Some(rental_id.into());
        self
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    #[inline]
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

/// Converts input validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let code = match &err {
            ValidationError::Required { .. } => ErrorCode::MissingFields,
            ValidationError::NotAllowed { field, .. } if field == "role" => ErrorCode::InvalidRole,
            _ => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, message),
            CoreError::Forbidden { .. } => ApiError::new(ErrorCode::Forbidden, message),
            CoreError::UserAlreadyRenting { rental_id } => {
                ApiError::new(ErrorCode::UserAlreadyRenting, message).with_rental(rental_id)
            }
            CoreError::CarAlreadyRented { rental_id } => {
                ApiError::new(ErrorCode::CarAlreadyRented, message).with_rental(rental_id)
            }
            CoreError::AlreadyClosed { rental_id } => {
                ApiError::new(ErrorCode::AlreadyClosed, message).with_rental(rental_id)
            }
            CoreError::UsernameTaken { .. } => ApiError::new(ErrorCode::UsernameTaken, message),
            CoreError::DuplicatePlate { .. } => ApiError::new(ErrorCode::DuplicatePlate, message),
            CoreError::InvalidCredentials => ApiError::new(ErrorCode::InvalidCredentials, message),
            CoreError::FeeOverflow { rental_id } => {
                tracing::error!(rental_id = %rental_id, "Rental fee out of range");
                ApiError::new(ErrorCode::Internal, message).with_rental(rental_id)
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => e.into(),
            DbError::UniqueViolation { table, column } => {
                tracing::warn!(%table, %column, "Unmapped unique violation");
                ApiError::new(
                    ErrorCode::ValidationError,
                    format!("{} already exists", column),
                )
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;
