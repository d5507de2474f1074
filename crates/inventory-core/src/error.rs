//! Error types for the inventory core.

use crate::ids::IdError;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Errors that can occur while parsing or validating inventory data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// The string is not a `PREFIX-YYMM-NNNN` UID.
    #[error("invalid UID: {0}")]
    InvalidUid(String),

    /// The string is not a `YYMM` month key.
    #[error("invalid year-month: {0}")]
    InvalidYearMonth(String),

    /// Unknown item status label.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Unknown audit action label.
    #[error("invalid audit action: {0}")]
    InvalidAction(String),

    /// A required field was empty or out of range.
    #[error("invalid field {field}: {message}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

impl InventoryError {
    /// Shorthand for a [`InventoryError::Validation`] error.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
