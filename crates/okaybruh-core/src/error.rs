//! # Shop Errors
//!
//! Every failure here is a notice for the shopper or admin, never a crash.
//!
//! ```text
//! "abc" typed as a quantity ──► ValidationError::InvalidFormat
//!                                    │
//!                                    ▼
//! product 99 not in catalog ──► CoreError ──► StoreError ──► ApiError
//!                                (this crate)  (okaybruh-store)  (shop app)
//! ```

use thiserror::Error;

/// A shop rule refused the operation; nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Unknown product, cart line or order id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Checkout was attempted with no cart lines.
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// `not_found("Product", 42)` reads "Product not found: 42".
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

// =============================================================================
// Form Input
// =============================================================================

/// A form field the shopper or admin typed was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or less where at least one is needed (quantities).
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Text where a number was expected, or a malformed id.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;
