//! Audit log writer.
//!
//! Every mutating handler records what it did here. Writing the audit entry
//! happens after the business operation has committed and can never undo or
//! fail it: store errors are logged and swallowed.

use std::sync::Arc;

use inventory_core::{AuditAction, AuditLogEntry, InventoryItem, NewAuditEntry, UserId};
use inventory_store::Store;

/// Appends entries to the audit log without ever failing the caller.
#[derive(Clone)]
pub struct AuditWriter {
    store: Arc<dyn Store>,
}

impl AuditWriter {
    /// Create a writer over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record an action.
    ///
    /// The stored UID is the live item's, else `explicit_uid`, else one found
    /// in a `(UID: ...)` fragment of `details`, else blank. Returns the written
    /// entry, or `None` if the store refused it.
    pub fn record(
        &self,
        user: Option<UserId>,
        item: Option<&InventoryItem>,
        action: AuditAction,
        details: Option<String>,
        explicit_uid: Option<&str>,
    ) -> Option<AuditLogEntry> {
        self.record_entry(NewAuditEntry::new(user, item, action, details, explicit_uid))
    }

    /// Record a prepared entry, e.g. one carrying old/new values.
    pub fn record_entry(&self, entry: NewAuditEntry) -> Option<AuditLogEntry> {
        let action = entry.action;
        let uid = entry.uid_no.clone();

        if uid.is_none() && entry.item_id.is_some() {
            tracing::debug!(action = %action, "Audit entry has an item but no UID");
        }

        match self.store.append_audit_entry(entry) {
            Ok(written) => {
                tracing::debug!(entry = %written, id = %written.id, "Audit entry recorded");
                Some(written)
            }
            Err(e) => {
                tracing::warn!(
                    action = %action,
                    uid = ?uid,
                    error = %e,
                    "Failed to write audit entry - continuing without"
                );
                None
            }
        }
    }
}
