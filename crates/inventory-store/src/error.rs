//! Error types for inventory storage.

use inventory_core::InventoryError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A record with this key already exists.
    #[error("{entity} already exists: {id}")]
    Conflict {
        /// Kind of record.
        entity: &'static str,
        /// The duplicated key.
        id: String,
    },

    /// An item refers to a location or project that is not registered.
    #[error("unknown {entity}: {name}")]
    UnknownReference {
        /// `"location"` or `"project"`.
        entity: &'static str,
        /// The unregistered name.
        name: String,
    },

    /// Not enough units to remove.
    #[error("insufficient quantity: available={available}, requested={requested}")]
    InsufficientQuantity {
        /// Units on hand.
        available: u32,
        /// Units requested.
        requested: u32,
    },

    /// The (prefix, month) counter cannot be incremented further.
    #[error("UID sequence exhausted for {prefix}-{year_month}")]
    SequenceExhausted {
        /// Category prefix.
        prefix: String,
        /// Month key.
        year_month: String,
    },

    /// The input failed validation.
    #[error(transparent)]
    Invalid(#[from] InventoryError),
}

impl StoreError {
    pub(crate) fn lock_poisoned() -> Self {
        Self::Database("store lock poisoned".into())
    }

    pub(crate) fn item_not_found(uid: &impl ToString) -> Self {
        Self::NotFound {
            entity: "item",
            id: uid.to_string(),
        }
    }
}
