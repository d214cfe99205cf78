//! # Store Errors
//!
//! Both backends fail with [`StoreError`]. Shop rules pass through
//! untouched; SQLite and HTTP failures are folded into a few kinds the
//! shop app can phrase as notices.
//!
//! ```text
//! CoreError ─────────────┐
//! sqlx::Error ───────────┼──► StoreError ──► ApiError { code, message }
//! reqwest::Error ────────┘
//! ```

use okaybruh_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule failed (NotFound, EmptyCart, invalid input).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Transport failure talking to the REST service.
    ///
    /// ## When This Occurs
    /// - Connection refused / DNS failure
    /// - Request timed out
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The REST service answered, but not with what we expected.
    #[error("Unexpected response ({status}): {message}")]
    UnexpectedResponse { status: u16, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored or received document could not be (de)serialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        StoreError::Core(CoreError::not_found(entity, id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Core(e) if e.is_not_found())
    }

    /// True for transport failures, where retrying later may help.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::BackendUnavailable(_))
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Core(CoreError::Validation(err))
    }
}

/// Pool exhaustion and a closed pool count as connection failures.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("Connection pool exhausted".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Convert reqwest errors to StoreError.
///
/// Transport problems become `BackendUnavailable`; a body that does not
/// decode is a `Serialization` error.
impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return StoreError::Serialization(err.to_string());
        }
        if let Some(status) = err.status() {
            return StoreError::UnexpectedResponse {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        StoreError::BackendUnavailable(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helpers() {
        let err = StoreError::not_found("Order", 9);
        assert!(err.is_not_found());
        assert!(!err.is_unavailable());
        assert_eq!(err.to_string(), "Order not found: 9");
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err: StoreError = CoreError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cart is empty");

        let err: StoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, StoreError::Core(CoreError::Validation(_))));
    }
}
