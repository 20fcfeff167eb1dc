//! # Database Error Types
//!
//! Error types for store operations and booking transitions.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── UniqueViolation { table, column }                            │
//! │       │        │                                                        │
//! │       │        ▼  (booking engine / repositories)                      │
//! │       │   Domain(UserAlreadyRenting | CarAlreadyRented |               │
//! │       │          UsernameTaken | DuplicatePlate)                       │
//! │       ▼                                                                 │
//! │  ApiError (rentline-service) ← code + message for the caller           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rentline_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A booking rule rejected the operation.
    ///
    /// Raised from inside the store layer when the decision depends on
    /// committed rows (conflicting open rental, closed rental, missing car).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate username or plate
    /// - A second open rental for the same user or car
    ///   (`UNIQUE constraint failed: rentals.user_id`)
    #[error("Unique constraint failed: {table}.{column}")]
    UniqueViolation { table: String, column: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Rental for a user id that does not exist
    /// - Car for a merchant id that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed, including CHECK and trigger aborts.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Returns the violated column when this is a unique violation on `table`.
    ///
    /// ## Example
    /// ```rust
    /// use rentline_db::DbError;
    ///
    /// let err = DbError::UniqueViolation {
    ///     table: "rentals".to_string(),
    ///     column: "car_id".to_string(),
    /// };
    /// assert_eq!(err.unique_column("rentals"), Some("car_id"));
    /// assert_eq!(err.unique_column("cars"), None);
    /// ```
    pub fn unique_column(&self, table: &str) -> Option<&str> {
        match self {
            DbError::UniqueViolation { table: t, column } if t == table => Some(column),
            _ => None,
        }
    }

    /// Returns the domain rejection, if this is one.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            DbError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

/// Splits `"UNIQUE constraint failed: rentals.user_id"` into
/// `("rentals", "user_id")`. Composite keys keep the first column.
fn parse_unique_target(message: &str) -> (String, String) {
    let target = message
        .split("UNIQUE constraint failed: ")
        .nth(1)
        .unwrap_or("unknown.unknown");
    let first = target.split(',').next().unwrap_or(target).trim();

    match first.split_once('.') {
        Some((table, column)) => (table.to_string(), column.to_string()),
        None => ("unknown".to_string(), first.to_string()),
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::Domain(NotFound)
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::Domain(CoreError::not_found("record", "unknown")),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if db_err.is_unique_violation() || msg.contains("UNIQUE constraint failed") {
                    let (table, column) = parse_unique_target(msg);
                    DbError::UniqueViolation { table, column }
                } else if db_err.is_foreign_key_violation()
                    || msg.contains("FOREIGN KEY constraint failed")
                {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unique_target() {
        assert_eq!(
            parse_unique_target("UNIQUE constraint failed: rentals.user_id"),
            ("rentals".to_string(), "user_id".to_string())
        );
        assert_eq!(
            parse_unique_target("UNIQUE constraint failed: cars.plate, cars.id"),
            ("cars".to_string(), "plate".to_string())
        );
    }

    #[test]
    fn test_domain_passthrough() {
        let err: DbError = CoreError::AlreadyClosed {
            rental_id: "r-1".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Rental already closed: r-1");
        assert!(err.as_domain().is_some());
    }
}
