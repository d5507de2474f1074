//! Audit log handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use inventory_core::AuditLogEntry;

use super::{default_limit, MAX_PAGE_SIZE};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Audit list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListAuditQuery {
    /// Only entries for this UID.
    #[serde(default)]
    pub uid: Option<String>,
    /// Maximum number of entries to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

/// Audit entry response.
#[derive(Debug, Serialize)]
pub struct AuditEntryResponse {
    /// Entry ID.
    pub id: u64,
    /// Affected item, or null once the item has been deleted.
    pub item_id: Option<String>,
    /// Preserved item UID.
    pub uid_no: Option<String>,
    /// Action code.
    pub action: String,
    /// Acting user, or null for system actions.
    pub user_id: Option<String>,
    /// Free-text details.
    pub details: Option<String>,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Timestamp.
    pub timestamp: String,
}

impl From<&AuditLogEntry> for AuditEntryResponse {
    fn from(entry: &AuditLogEntry) -> Self {
        Self {
            id: entry.id.get(),
            item_id: entry.item_id.map(|id| id.to_string()),
            uid_no: entry.uid_no.clone(),
            action: entry.action.to_string(),
            user_id: entry.user_id.map(|u| u.to_string()),
            details: entry.details.clone(),
            old_value: entry.old_value.clone(),
            new_value: entry.new_value.clone(),
            timestamp: entry.timestamp.to_rfc3339(),
        }
    }
}

/// List audit entries response.
#[derive(Debug, Serialize)]
pub struct ListAuditResponse {
    /// Entries (newest first).
    pub entries: Vec<AuditEntryResponse>,
    /// Whether there are more entries.
    pub has_more: bool,
}

/// List the audit log.
pub async fn list_audit(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Query(query): Query<ListAuditQuery>,
) -> Result<Json<ListAuditResponse>, ApiError> {
    let uid = query.uid.as_deref().map(str::trim).filter(|s| !s.is_empty());

    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(MAX_PAGE_SIZE);
    let entries = state
        .store
        .list_audit_entries(uid, limit + 1, query.offset)?;

    let has_more = entries.len() > limit;
    let entries: Vec<_> = entries
        .iter()
        .take(limit)
        .map(AuditEntryResponse::from)
        .collect();

    Ok(Json(ListAuditResponse { entries, has_more }))
}
