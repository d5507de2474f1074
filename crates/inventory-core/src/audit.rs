//! Audit log types.
//!
//! An audit entry keeps a weak reference to its item (`item_id`) and a
//! denormalized copy of the item's UID. The reference may dangle once the item
//! is deleted; the UID copy is what keeps the entry readable.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::InventoryError;
use crate::{AuditEntryId, InventoryItem, ItemId, UserId};

/// Matches a `(UID: LAP-2507-0001)` fragment in free-text details.
static DETAILS_UID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(UID:\s*([^()\s]+)\s*\)").expect("UID pattern is a valid regex")
});

/// Kind of state change recorded by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Item created.
    Added,
    /// Item fields edited.
    Updated,
    /// Item removed.
    Deleted,
    /// Item moved to another location.
    Transferred,
    /// Only the status changed.
    StatusChange,
    /// Item assigned to a project.
    AssignedToProject,
    /// Item removed from its project.
    UnassignedFromProject,
    /// Only the location changed, through a general edit.
    LocationChange,
    /// Part of the quantity removed; the item remains.
    QuantityReduced,
    /// Items exported.
    Exported,
    /// User logged in.
    Login,
    /// User logged out.
    Logout,
}

impl AuditAction {
    /// Every action.
    pub const ALL: [Self; 12] = [
        Self::Added,
        Self::Updated,
        Self::Deleted,
        Self::Transferred,
        Self::StatusChange,
        Self::AssignedToProject,
        Self::UnassignedFromProject,
        Self::LocationChange,
        Self::QuantityReduced,
        Self::Exported,
        Self::Login,
        Self::Logout,
    ];

    /// Stable snake-case code, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Transferred => "transferred",
            Self::StatusChange => "status_change",
            Self::AssignedToProject => "assigned_to_project",
            Self::UnassignedFromProject => "unassigned_from_project",
            Self::LocationChange => "location_change",
            Self::QuantityReduced => "quantity_reduced",
            Self::Exported => "exported",
            Self::Login => "login",
            Self::Logout => "logout",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| InventoryError::InvalidAction(s.to_string()))
    }
}

/// Pull the UID out of a `(UID: <id>)` fragment, if the details contain one.
#[must_use]
pub fn extract_uid_from_details(details: &str) -> Option<&str> {
    DETAILS_UID_RE
        .captures(details)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Decide which UID an audit entry should carry.
///
/// Preference order: the live item's UID, then `explicit_uid`, then a UID
/// found in `details`. Returns `None` when none of them yields one.
#[must_use]
pub fn resolve_uid(
    item: Option<&InventoryItem>,
    explicit_uid: Option<&str>,
    details: Option<&str>,
) -> Option<String> {
    if let Some(item) = item {
        return Some(item.uid_no.to_string());
    }
    if let Some(uid) = explicit_uid.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(uid.to_string());
    }
    details
        .and_then(extract_uid_from_details)
        .map(ToString::to_string)
}

/// An audit entry that has not been written yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    /// Weak reference to the affected item.
    pub item_id: Option<ItemId>,
    /// Preserved copy of the item's UID.
    pub uid_no: Option<String>,
    /// What happened.
    pub action: AuditAction,
    /// Who did it; `None` for system actions.
    pub user_id: Option<UserId>,
    /// Free-text details.
    pub details: Option<String>,
    /// Snapshot of the value before the change.
    pub old_value: Option<String>,
    /// Snapshot of the value after the change.
    pub new_value: Option<String>,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
}

impl NewAuditEntry {
    /// Build an entry, resolving its UID with [`resolve_uid`].
    #[must_use]
    pub fn new(
        user_id: Option<UserId>,
        item: Option<&InventoryItem>,
        action: AuditAction,
        details: Option<String>,
        explicit_uid: Option<&str>,
    ) -> Self {
        let uid_no = resolve_uid(item, explicit_uid, details.as_deref());
        Self {
            item_id: item.map(|i| i.id),
            uid_no,
            action,
            user_id,
            details,
            old_value: None,
            new_value: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach an old/new value snapshot.
    #[must_use]
    pub fn with_values(mut self, old_value: Option<String>, new_value: Option<String>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }
}

/// A written, immutable audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Write-order identifier.
    pub id: AuditEntryId,
    /// Weak reference to the affected item. Stores report `None` once the item is gone.
    pub item_id: Option<ItemId>,
    /// Preserved copy of the item's UID.
    pub uid_no: Option<String>,
    /// What happened.
    pub action: AuditAction,
    /// Who did it.
    pub user_id: Option<UserId>,
    /// Free-text details.
    pub details: Option<String>,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Stamp a pending entry with its id.
    #[must_use]
    pub fn from_new(id: AuditEntryId, entry: NewAuditEntry) -> Self {
        Self {
            id,
            item_id: entry.item_id,
            uid_no: entry.uid_no,
            action: entry.action,
            user_id: entry.user_id,
            details: entry.details,
            old_value: entry.old_value,
            new_value: entry.new_value,
            timestamp: entry.timestamp,
        }
    }
}

impl fmt::Display for AuditLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = self
            .user_id
            .map_or_else(|| "system".to_string(), |u| u.to_string());
        write!(
            f,
            "[{}] {} - {} by {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.uid_no.as_deref().unwrap_or("unknown item"),
            self.action,
            user
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, NewItem, Uid, YearMonth};

    fn item() -> InventoryItem {
        let uid = Uid::new(Category::Server, YearMonth::new(25, 7).unwrap(), 9);
        InventoryItem::from_new(
            NewItem::new(Category::Server, "PowerEdge"),
            ItemId::generate(),
            uid,
            Utc::now(),
        )
    }

    #[test]
    fn extracts_uid_fragment() {
        assert_eq!(
            extract_uid_from_details("Removed 2 units (UID: LAP-2507-0001)"),
            Some("LAP-2507-0001")
        );
        assert_eq!(
            extract_uid_from_details("legacy (UID:INV-A1B2C3D4) gone"),
            Some("INV-A1B2C3D4")
        );
        assert_eq!(extract_uid_from_details("no uid here"), None);
        assert_eq!(extract_uid_from_details("(UID: )"), None);
    }

    #[test]
    fn live_item_wins() {
        let item = item();
        let uid = resolve_uid(
            Some(&item),
            Some("MON-2507-0001"),
            Some("(UID: PRN-2507-0001)"),
        );
        assert_eq!(uid.as_deref(), Some("SRV-2507-0009"));
    }

    #[test]
    fn explicit_uid_beats_details() {
        let uid = resolve_uid(None, Some("MON-2507-0001"), Some("(UID: PRN-2507-0001)"));
        assert_eq!(uid.as_deref(), Some("MON-2507-0001"));
    }

    #[test]
    fn details_used_as_last_resort() {
        let uid = resolve_uid(None, Some("  "), Some("deleted (UID: PRN-2507-0001)"));
        assert_eq!(uid.as_deref(), Some("PRN-2507-0001"));
    }

    #[test]
    fn unresolvable_uid_is_blank() {
        assert_eq!(resolve_uid(None, None, Some("logged in")), None);
        assert_eq!(resolve_uid(None, None, None), None);
    }

    #[test]
    fn new_entry_links_item() {
        let item = item();
        let entry = NewAuditEntry::new(None, Some(&item), AuditAction::Added, None, None);
        assert_eq!(entry.item_id, Some(item.id));
        assert_eq!(entry.uid_no.as_deref(), Some("SRV-2507-0009"));
    }

    #[test]
    fn action_codes_roundtrip() {
        for action in AuditAction::ALL {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn display_reads_like_a_log_line() {
        let entry = AuditLogEntry::from_new(
            AuditEntryId::new(1),
            NewAuditEntry::new(None, None, AuditAction::Deleted, None, Some("LAP-2507-0001")),
        );
        let line = entry.to_string();
        assert!(line.ends_with("LAP-2507-0001 - deleted by system"), "{line}");
    }
}
