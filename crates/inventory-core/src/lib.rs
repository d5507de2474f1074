//! Core types and utilities for the inventory tracker.
//!
//! This crate provides the foundational types used throughout the workspace:
//!
//! - **Identifiers**: `ItemId`, `UserId`, `AuditEntryId`
//! - **UIDs**: `Uid`, `YearMonth`, `SequenceCounter`, `Category`
//! - **Items**: `InventoryItem`, `NewItem`, `ItemChanges`, `ItemFilter`, `ItemStatus`
//! - **Catalog**: `Location`, `Project`
//! - **Audit**: `AuditLogEntry`, `NewAuditEntry`, `AuditAction`
//!
//! # UID Format
//!
//! **`PREFIX-YYMM-NNNN`**, e.g. `LAP-2507-0001`
//!
//! - `PREFIX` comes from the item's category (`LAP` for laptops, `OTH` for anything unknown)
//! - `YYMM` is the UTC month of creation
//! - `NNNN` is a per-(prefix, month) sequence, zero-padded to at least four digits

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod audit;
pub mod catalog;
pub mod category;
pub mod error;
pub mod ids;
pub mod item;
pub mod uid;

pub use audit::{extract_uid_from_details, resolve_uid, AuditAction, AuditLogEntry, NewAuditEntry};
pub use catalog::{Location, Project};
pub use category::Category;
pub use error::{InventoryError, Result};
pub use ids::{AuditEntryId, IdError, ItemId, ItemIdGenerator, UserId};
pub use item::{
    FieldChange, InventoryItem, ItemChanges, ItemFilter, ItemStatus, NewItem, DEFAULT_QUANTITY,
};
pub use uid::{SequenceCounter, Uid, YearMonth, MIN_SEQUENCE_WIDTH};
