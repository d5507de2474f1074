//! Storage layer for the inventory tracker.
//!
//! This crate provides persistent storage for items, UID sequence counters,
//! the audit log, and the location/project catalog.
//!
//! # Backends
//!
//! - [`RocksStore`] (feature `rocksdb-backend`, on by default): `RocksDB` with
//!   one column family per record kind. Every read-modify-write runs under a
//!   store-wide write lock and commits through a single `WriteBatch`.
//! - [`MemoryStore`]: everything behind one mutex. Used by tests and when the
//!   service is built without `RocksDB`.
//!
//! # UID allocation
//!
//! [`Store::create_item`] increments the (category, month) counter, stamps the
//! UID and inserts the item in one atomic step. If the write fails neither the
//! counter nor the item changes, so a UID is never handed out that the counter
//! does not reflect.
//!
//! # Example
//!
//! ```no_run
//! use inventory_core::{Category, NewItem, YearMonth};
//! use inventory_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let month = YearMonth::new(25, 7).unwrap();
//!
//! let item = store
//!     .create_item(NewItem::new(Category::Laptop, "ThinkPad X1"), month)
//!     .unwrap();
//! assert_eq!(item.uid_no.to_string(), "LAP-2507-0001");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use inventory_core::{
    AuditLogEntry, Category, FieldChange, InventoryItem, ItemChanges, ItemFilter, ItemId,
    Location, NewAuditEntry, NewItem, Project, SequenceCounter, Uid, YearMonth,
};

/// Outcome of removing part of an item's quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityReduction {
    /// Some units remain; the updated item.
    Reduced(InventoryItem),
    /// Nothing remains and the item was deleted; its last state, with quantity 0.
    Deleted(InventoryItem),
}

/// Units left after removing `quantity` from `item`.
fn remaining_after(item: &InventoryItem, quantity: u32) -> Result<u32> {
    if quantity == 0 {
        return Err(inventory_core::InventoryError::validation(
            "quantity",
            "must be at least 1",
        )
        .into());
    }
    item.quantity
        .checked_sub(quantity)
        .ok_or(StoreError::InsufficientQuantity {
            available: item.quantity,
            requested: quantity,
        })
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (`RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    // =========================================================================
    // UID Sequences
    // =========================================================================

    /// Allocate the next UID for (category, month) without creating an item.
    ///
    /// # Errors
    ///
    /// - `StoreError::SequenceExhausted` if the counter is at `u32::MAX`.
    /// - `StoreError::Database` if the incremented counter cannot be persisted.
    fn allocate_uid(&self, category: Category, year_month: YearMonth) -> Result<Uid>;

    /// Read the counter for (category, month), if any UID was allocated for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_sequence(
        &self,
        category: Category,
        year_month: YearMonth,
    ) -> Result<Option<SequenceCounter>>;

    // =========================================================================
    // Item Operations
    // =========================================================================

    /// Create an item, allocating its UID in the same atomic write.
    ///
    /// # Errors
    ///
    /// - `StoreError::Invalid` if the payload fails validation.
    /// - `StoreError::UnknownReference` for an unregistered location or project.
    /// - `StoreError::SequenceExhausted` if the counter is at `u32::MAX`.
    fn create_item(&self, new: NewItem, year_month: YearMonth) -> Result<InventoryItem>;

    /// Get an item by storage id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_item(&self, id: &ItemId) -> Result<Option<InventoryItem>>;

    /// Get an item by UID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_item_by_uid(&self, uid: &Uid) -> Result<Option<InventoryItem>>;

    /// List items matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_items(
        &self,
        filter: &ItemFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InventoryItem>>;

    /// Edit an item. Returns the updated item and the fields that changed.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no item has this UID.
    /// - `StoreError::Invalid` if the edit fails validation.
    /// - `StoreError::UnknownReference` for an unregistered location or project.
    fn update_item(
        &self,
        uid: &Uid,
        changes: ItemChanges,
    ) -> Result<(InventoryItem, Vec<FieldChange>)>;

    /// Remove `quantity` units, deleting the item when none remain.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no item has this UID.
    /// - `StoreError::Invalid` if `quantity` is zero.
    /// - `StoreError::InsufficientQuantity` if more units are requested than exist.
    fn reduce_quantity(&self, uid: &Uid, quantity: u32) -> Result<QuantityReduction>;

    /// Delete an item outright. Returns its last state.
    ///
    /// The UID is not released: the counter never goes backwards.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no item has this UID.
    fn delete_item(&self, uid: &Uid) -> Result<InventoryItem>;

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Register a location.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the name is taken.
    fn put_location(&self, location: &Location) -> Result<()>;

    /// List locations by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_locations(&self) -> Result<Vec<Location>>;

    /// Register a project.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the name is taken.
    fn put_project(&self, project: &Project) -> Result<()>;

    /// List projects by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_projects(&self) -> Result<Vec<Project>>;

    // =========================================================================
    // Audit Log Operations
    // =========================================================================

    /// Append an audit entry, assigning the next entry id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn append_audit_entry(&self, entry: NewAuditEntry) -> Result<AuditLogEntry>;

    /// List audit entries, newest first, optionally only those for one UID.
    ///
    /// Entries whose item has since been deleted come back with `item_id: None`
    /// and their preserved `uid_no`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_audit_entries(
        &self,
        uid: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditLogEntry>>;
}
