//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Item records, keyed by `item_id` (ULID).
    pub const ITEMS: &str = "items";

    /// Index: items by UID, keyed by the UID string. Value is the `item_id`.
    pub const ITEMS_BY_UID: &str = "items_by_uid";

    /// UID sequence counters, keyed by `prefix:YYMM`.
    pub const SEQUENCES: &str = "sequences";

    /// Audit entries, keyed by big-endian entry id.
    pub const AUDIT_LOG: &str = "audit_log";

    /// Index: audit entries by UID, keyed by `uid || 0x00 || entry_id`.
    /// Value is empty (index only).
    pub const AUDIT_BY_UID: &str = "audit_by_uid";

    /// Locations, keyed by name.
    pub const LOCATIONS: &str = "locations";

    /// Projects, keyed by name.
    pub const PROJECTS: &str = "projects";

    /// Store-level counters (e.g. the last audit entry id).
    pub const META: &str = "meta";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ITEMS,
        cf::ITEMS_BY_UID,
        cf::SEQUENCES,
        cf::AUDIT_LOG,
        cf::AUDIT_BY_UID,
        cf::LOCATIONS,
        cf::PROJECTS,
        cf::META,
    ]
}
