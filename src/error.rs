//! Error types for bakeshop-store.
//!
//! All errors are strongly typed using thiserror. Backend failures are caught
//! at the store boundary and converted into a structured failure outcome; a
//! missing record is never an error (operations return an explicit empty
//! result instead).

use thiserror::Error;

/// Validation errors raised before any backend call is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("rating {value} is out of range [0, 5]")]
    RatingOutOfRange { value: f64 },

    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("an order must contain at least one item")]
    NoOrderItems,

    #[error("order item '{cake_name}' must have quantity >= 1")]
    ZeroQuantityItem { cake_name: String },

    #[error("price {value} cannot be negative")]
    NegativePrice { value: f64 },
}

/// Failures reported by the remote backend adapter.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The addressed record does not exist on the backend.
    #[error("collection '{collection}': record '{id}' not found")]
    Missing { collection: String, id: String },

    /// The backend rejected the request (duplicate key, malformed payload).
    #[error("backend rejected request: {message}")]
    Rejected { message: String },

    /// The backend could not be reached.
    #[error("backend unavailable: {message}")]
    Unavailable { message: String },
}

/// Top-level error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("backend failure: {0}")]
    Backend(#[from] BackendError),

    /// A backend document could not be decoded into the typed entity,
    /// including documents carrying unknown fields.
    #[error("decode error in collection '{collection}': {message}")]
    Decode {
        collection: &'static str,
        message: String,
    },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl StoreError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a backend failure.
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    /// Returns true if this is a decode error.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
