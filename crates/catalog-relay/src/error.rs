//! Error types for catalog-relay

use catalog_store::StoreError;
use thiserror::Error;

/// Result type alias for pagination operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors surfaced by the pagination engine.
///
/// `InvalidCursor` and `InvalidFilterValue` are caller mistakes and are raised
/// before any query runs. `DataSource` wraps row-source failures unchanged.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Cursor string does not decode to a non-negative id
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// A filter or page argument could not be coerced
    #[error("Invalid value for '{field}': {message}")]
    InvalidFilterValue { field: String, message: String },

    /// Malformed environment/configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Row source failure
    #[error("Data source error: {0}")]
    DataSource(#[from] StoreError),
}

impl RelayError {
    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Self::InvalidCursor(message.into())
    }

    /// Create an invalid value error for a specific field
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_invalid_cursor(&self) -> bool {
        matches!(self, Self::InvalidCursor(_))
    }

    pub fn is_invalid_filter_value(&self) -> bool {
        matches!(self, Self::InvalidFilterValue { .. })
    }

    pub fn is_data_source(&self) -> bool {
        matches!(self, Self::DataSource(_))
    }

    /// The offending field for [`RelayError::InvalidFilterValue`].
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidFilterValue { field, .. } => Some(field),
            _ => None,
        }
    }
}
