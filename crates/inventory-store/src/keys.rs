//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in column families.

use inventory_core::{AuditEntryId, Category, ItemId, YearMonth};

/// Key in the `meta` column family holding the last audit entry id.
pub const LAST_AUDIT_ID: &[u8] = b"last_audit_id";

/// Separates the UID from the entry id in audit index keys. UIDs never contain it.
const UID_SEPARATOR: u8 = 0x00;

/// Create an item key from an item ID.
#[must_use]
pub fn item_key(item_id: &ItemId) -> Vec<u8> {
    item_id.to_bytes().to_vec()
}

/// Decode an item ID stored as a key or index value.
///
/// Returns `None` if the bytes are not 16 bytes long.
#[must_use]
pub fn decode_item_id(bytes: &[u8]) -> Option<ItemId> {
    let bytes: [u8; 16] = bytes.try_into().ok()?;
    Some(ItemId::from_bytes(bytes))
}

/// Create a UID index key.
#[must_use]
pub fn uid_key(uid: &str) -> Vec<u8> {
    uid.as_bytes().to_vec()
}

/// Create a sequence counter key.
///
/// Format: `prefix:YYMM`, e.g. `LAP:2507`.
#[must_use]
pub fn sequence_key(category: Category, year_month: YearMonth) -> Vec<u8> {
    format!("{}:{year_month}", category.prefix()).into_bytes()
}

/// Create an audit entry key.
///
/// Big-endian, so iteration order is write order.
#[must_use]
pub fn audit_key(id: AuditEntryId) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

/// Create a UID-audit index key.
///
/// Format: `uid || 0x00 || entry_id (8 bytes, big-endian)`
#[must_use]
pub fn audit_uid_key(uid: &str, id: AuditEntryId) -> Vec<u8> {
    let mut key = audit_uid_prefix(uid);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Create a prefix for iterating all audit entries for a UID.
#[must_use]
pub fn audit_uid_prefix(uid: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(uid.len() + 9);
    key.extend_from_slice(uid.as_bytes());
    key.push(UID_SEPARATOR);
    key
}

/// Extract the entry ID from a UID-audit index key.
///
/// Returns `None` if the key is shorter than 8 bytes.
#[must_use]
pub fn extract_audit_id_from_uid_key(key: &[u8]) -> Option<AuditEntryId> {
    let tail = key.len().checked_sub(8).map(|start| &key[start..])?;
    decode_audit_id(tail)
}

/// Decode a big-endian audit entry id.
#[must_use]
pub fn decode_audit_id(bytes: &[u8]) -> Option<AuditEntryId> {
    let bytes: [u8; 8] = bytes.try_into().ok()?;
    Some(AuditEntryId::new(u64::from_be_bytes(bytes)))
}
