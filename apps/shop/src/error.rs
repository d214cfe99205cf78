//! # API Error Type
//!
//! Unified error type for shop commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command Function  Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Validation? ── ValidationError ──────────────┐                         │
//! │  Empty cart? ── CoreError::EmptyCart ─────────┤                         │
//! │  Missing id? ── NotFound ─────────────────────┼──► ApiError {code, msg} │
//! │  Offline?    ── StoreError::BackendUnavailable┤          │              │
//! │  SQLite?     ── StoreError::QueryFailed ──────┘          ▼              │
//! │                                                 stderr notice, exit 1   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage internals are logged, not shown: the user gets a short notice.

use serde::Serialize;
use tracing::error;

use okaybruh_core::{CoreError, ValidationError};
use okaybruh_store::StoreError;

use crate::state::ConfigError;

/// Error returned from shop commands.
///
/// ## Serialization
/// With `--json` a failed command prints:
/// ```json
/// { "code": "EMPTY_CART", "message": "Cart is empty" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for the notice
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, cart line or order does not exist
    NotFound,

    /// Input rejected before anything was written
    InvalidInput,

    /// Checkout attempted with nothing in the cart
    EmptyCart,

    /// Remote service unreachable or timed out
    BackendUnavailable,

    /// Local database or remote response problem
    StorageError,

    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidInput, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            CoreError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, "Cart is empty"),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(e) => ApiError::from(e),
            StoreError::BackendUnavailable(e) => {
                error!("Backend unavailable: {}", e);
                ApiError::new(
                    ErrorCode::BackendUnavailable,
                    "Shop service is unavailable, please try again",
                )
            }
            StoreError::UnexpectedResponse { status, message } => {
                error!(status, "Unexpected service response: {}", message);
                ApiError::new(
                    ErrorCode::StorageError,
                    format!("Shop service error ({}): {}", status, message),
                )
            }
            StoreError::ConnectionFailed(e) | StoreError::MigrationFailed(e) => {
                error!("Database unavailable: {}", e);
                ApiError::new(ErrorCode::StorageError, "Local database is unavailable")
            }
            StoreError::QueryFailed(e) | StoreError::Serialization(e) => {
                error!("Storage operation failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
            StoreError::Internal(e) => {
                error!("Internal storage error: {}", e);
                ApiError::internal(e)
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::invalid_input(format!("Configuration error: {}", err))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        error!("I/O error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
