//! Identifier types for the inventory tracker.
//!
//! This module provides strongly-typed identifiers for items, users, and audit entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// A user identifier (UUID format).
///
/// User IDs are extracted from the bearer token of authenticated requests.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(uuid::Uuid);

impl UserId {
    /// Create a new `UserId` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random `UserId` (for testing).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0.to_string()
    }
}

/// An item identifier using ULID for time-ordering.
///
/// Item IDs are the primary storage key. Stores mint them with an
/// [`ItemIdGenerator`], so they sort by creation order even within one
/// millisecond and a reverse scan of the item table lists the newest first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(Ulid);

impl ItemId {
    /// Generate a new `ItemId` with the current timestamp.
    ///
    /// IDs from separate calls in the same millisecond are not ordered; use
    /// [`ItemIdGenerator`] where creation order matters.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Return the bytes of the ULID (16 bytes).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }

    /// Create an `ItemId` from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Ulid::from_bytes(bytes))
    }
}

impl FromStr for ItemId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
        Ok(Self(ulid))
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ItemId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0.to_string()
    }
}

/// Mints strictly increasing [`ItemId`]s.
///
/// Within one millisecond the random part is incremented instead of redrawn.
/// Callers hold it behind the same lock that serializes item creation.
pub struct ItemIdGenerator(ulid::Generator);

impl ItemIdGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Generator::new())
    }

    /// The next ID, greater than every ID this generator returned before.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Exhausted` if the random part overflows within a
    /// single millisecond.
    pub fn next_id(&mut self) -> Result<ItemId, IdError> {
        self.0
            .generate()
            .map(ItemId)
            .map_err(|_| IdError::Exhausted)
    }
}

impl Default for ItemIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// An audit log entry identifier.
///
/// Assigned by the store from a monotonic sequence, so ordering by id is
/// ordering by write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditEntryId(u64);

impl AuditEntryId {
    /// Create an `AuditEntryId` from its sequence number.
    #[must_use]
    pub const fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Return the sequence number.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Big-endian bytes, so lexicographic key order matches numeric order.
    #[must_use]
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for AuditEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,

    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,

    /// No more IDs can be minted in the current millisecond.
    #[error("item ID space exhausted for this millisecond")]
    Exhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_serde_json() {
        let id = UserId::generate();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn user_id_rejects_garbage() {
        assert_eq!("not-a-uuid".parse::<UserId>(), Err(IdError::InvalidUuid));
    }

    #[test]
    fn item_id_bytes_roundtrip() {
        let id = ItemId::generate();
        assert_eq!(ItemId::from_bytes(id.to_bytes()), id);
    }

    #[test]
    fn item_ids_sort_by_creation_time() {
        let first = ItemId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = ItemId::generate();
        assert!(first < second);
    }

    #[test]
    fn generated_ids_increase_within_one_millisecond() {
        let mut ids = ItemIdGenerator::new();
        let minted: Vec<ItemId> = (0..1000).map(|_| ids.next_id().unwrap()).collect();
        assert!(minted.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(minted
            .windows(2)
            .all(|pair| pair[0].to_bytes() < pair[1].to_bytes()));
    }

    #[test]
    fn audit_entry_id_key_order_matches_numeric_order() {
        let low = AuditEntryId::new(255);
        let high = AuditEntryId::new(256);
        assert!(low.to_be_bytes() < high.to_be_bytes());
    }
}
