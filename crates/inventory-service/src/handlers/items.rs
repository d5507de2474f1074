//! Inventory item handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use inventory_core::{
    AuditAction, Category, FieldChange, InventoryItem, ItemChanges, ItemFilter, ItemStatus,
    NewAuditEntry, NewItem, Uid, YearMonth,
};
use inventory_store::QuantityReduction;

use super::{default_limit, MAX_PAGE_SIZE};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::export::items_to_csv;
use crate::state::AppState;

/// Item response.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// Storage ID.
    pub id: String,
    /// Human-readable UID.
    pub uid_no: String,
    /// Category label.
    pub category: String,
    /// UID prefix of the category.
    pub category_prefix: String,
    /// Display name.
    pub item_name: String,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Location name.
    pub location: Option<String>,
    /// Project name.
    pub project: Option<String>,
    /// Status code.
    pub status: ItemStatus,
    /// Status label.
    pub status_label: String,
    /// Units on hand.
    pub quantity: u32,
    /// Description.
    pub description: Option<String>,
    /// Document reference.
    pub document: Option<String>,
    /// Image reference.
    pub image: Option<String>,
    /// CPU model.
    pub cpu: Option<String>,
    /// GPU model.
    pub gpu: Option<String>,
    /// Operating system.
    pub os: Option<String>,
    /// Installed software.
    pub installed_software: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl From<&InventoryItem> for ItemResponse {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id.to_string(),
            uid_no: item.uid_no.to_string(),
            category: item.category.label().to_string(),
            category_prefix: item.category.prefix().to_string(),
            item_name: item.item_name.clone(),
            serial_number: item.serial_number.clone(),
            location: item.location.clone(),
            project: item.project.clone(),
            status: item.status,
            status_label: item.status.to_string(),
            quantity: item.quantity,
            description: item.description.clone(),
            document: item.document.clone(),
            image: item.image.clone(),
            cpu: item.cpu.clone(),
            gpu: item.gpu.clone(),
            os: item.os.clone(),
            installed_software: item.installed_software.clone(),
            created_at: item.created_at.to_rfc3339(),
            updated_at: item.updated_at.to_rfc3339(),
        }
    }
}

fn parse_uid(raw: &str) -> Result<Uid, ApiError> {
    raw.trim().parse::<Uid>().map_err(ApiError::from)
}

fn fetch_item(state: &AppState, uid: &Uid) -> Result<InventoryItem, ApiError> {
    state
        .store
        .get_item_by_uid(uid)?
        .ok_or_else(|| ApiError::NotFound(format!("Item not found: {uid}")))
}

// ============================================================================
// Create
// ============================================================================

/// Create item request.
///
/// `category` is taken as a raw label so an unknown one can be logged before
/// falling back to `Other`.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Remaining item fields.
    #[serde(flatten)]
    pub item: NewItem,
}

/// Create an item and allocate its UID.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let mut new = body.item;
    new.category = match body.category.as_deref().map(str::trim) {
        None | Some("") => Category::Other,
        Some(label) => Category::from_label(label).unwrap_or_else(|| {
            tracing::warn!(category = %label, "Unknown category, using OTH prefix");
            Category::Other
        }),
    };

    let item = state.store.create_item(new, YearMonth::now())?;

    tracing::info!(
        user_id = %auth.user_id,
        uid = %item.uid_no,
        category = %item.category,
        "Item created"
    );

    state.audit.record(
        Some(auth.user_id),
        Some(&item),
        AuditAction::Added,
        Some(format!("Added {} ({})", item.item_name, item.category)),
        None,
    );

    Ok((StatusCode::CREATED, Json(ItemResponse::from(&item))))
}

// ============================================================================
// Read
// ============================================================================

/// Item list/export query parameters.
#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// Exact item name.
    #[serde(default)]
    pub item_name: Option<String>,
    /// Status code or label.
    #[serde(default)]
    pub status: Option<String>,
    /// Exact location name.
    #[serde(default)]
    pub location: Option<String>,
    /// Category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text search over name, UID and serial number.
    #[serde(default)]
    pub search: Option<String>,
    /// Maximum number of items to return (default: 50). Ignored by export.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0). Ignored by export.
    #[serde(default)]
    pub offset: usize,
}

impl ListItemsQuery {
    fn filter(&self) -> Result<ItemFilter, ApiError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(s.parse::<ItemStatus>()?),
        };
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => Some(
                Category::from_label(label)
                    .ok_or_else(|| ApiError::BadRequest(format!("unknown category: {label}")))?,
            ),
        };

        Ok(ItemFilter {
            item_name: self.item_name.clone(),
            status,
            location: self.location.clone(),
            category,
            search: self.search.clone(),
        })
    }
}

/// List items response.
#[derive(Debug, Serialize)]
pub struct ListItemsResponse {
    /// Items (newest first).
    pub items: Vec<ItemResponse>,
    /// Whether there are more items.
    pub has_more: bool,
}

/// List and filter items.
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<ListItemsResponse>, ApiError> {
    let filter = query.filter()?;

    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(MAX_PAGE_SIZE);
    let items = state.store.list_items(&filter, limit + 1, query.offset)?;

    let has_more = items.len() > limit;
    let items: Vec<_> = items.iter().take(limit).map(ItemResponse::from).collect();

    Ok(Json(ListItemsResponse { items, has_more }))
}

/// Look up one item by UID.
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let uid = parse_uid(&uid)?;
    let item = fetch_item(&state, &uid)?;
    Ok(Json(ItemResponse::from(&item)))
}

/// Export the filtered items as CSV.
pub async fn export_items(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListItemsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.filter()?;
    let items = state
        .store
        .list_items(&filter, state.config.export_max_rows, 0)?;
    let csv = items_to_csv(&items)?;

    tracing::info!(user_id = %auth.user_id, count = items.len(), "Items exported");

    state.audit.record(
        Some(auth.user_id),
        None,
        AuditAction::Exported,
        Some(format!("Exported {} items to CSV", items.len())),
        None,
    );

    let disposition = format!(
        "attachment; filename=\"inventory_export_{}.csv\"",
        Utc::now().format("%Y%m%d_%H%M%S")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

// ============================================================================
// Update
// ============================================================================

/// Pick the audit action for a general edit from what it changed.
fn update_action(diff: &[FieldChange]) -> AuditAction {
    match diff {
        [only] if only.field == "status" => AuditAction::StatusChange,
        [only] if only.field == "location" => AuditAction::LocationChange,
        _ => AuditAction::Updated,
    }
}

fn update_entry(
    auth: &AuthUser,
    item: &InventoryItem,
    diff: &[FieldChange],
) -> NewAuditEntry {
    let fields: Vec<_> = diff.iter().map(|c| c.field).collect();
    let entry = NewAuditEntry::new(
        Some(auth.user_id),
        Some(item),
        update_action(diff),
        Some(format!("Updated fields: {}", fields.join(", "))),
        None,
    );

    match diff {
        [only] => entry.with_values(only.old.clone(), only.new.clone()),
        _ => entry,
    }
}

/// Edit an item.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(uid): Path<String>,
    Json(changes): Json<ItemChanges>,
) -> Result<Json<ItemResponse>, ApiError> {
    let uid = parse_uid(&uid)?;
    let (item, diff) = state.store.update_item(&uid, changes)?;

    if diff.is_empty() {
        tracing::debug!(uid = %uid, "Update changed nothing");
    } else {
        tracing::info!(user_id = %auth.user_id, uid = %uid, changed = diff.len(), "Item updated");
        state.audit.record_entry(update_entry(&auth, &item, &diff));
    }

    Ok(Json(ItemResponse::from(&item)))
}

/// Transfer request.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Destination location name.
    pub location: String,
}

/// Move an item to another registered location.
pub async fn transfer_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(uid): Path<String>,
    Json(body): Json<TransferRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let uid = parse_uid(&uid)?;
    let destination = body.location.trim();
    if destination.is_empty() {
        return Err(ApiError::BadRequest("location must not be empty".into()));
    }

    let changes = ItemChanges {
        location: Some(destination.to_string()),
        ..ItemChanges::default()
    };
    let (item, diff) = state.store.update_item(&uid, changes)?;

    if let [change] = diff.as_slice() {
        let from = change.old.as_deref().unwrap_or("no location");
        tracing::info!(
            user_id = %auth.user_id,
            uid = %uid,
            from = %from,
            to = %destination,
            "Item transferred"
        );

        let entry = NewAuditEntry::new(
            Some(auth.user_id),
            Some(&item),
            AuditAction::Transferred,
            Some(format!("Transferred from {from} to {destination}")),
            None,
        )
        .with_values(change.old.clone(), change.new.clone());
        state.audit.record_entry(entry);
    }

    Ok(Json(ItemResponse::from(&item)))
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// Status code (`in_use`) or label (`In Use`).
    pub status: String,
}

/// Change an item's status.
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(uid): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let uid = parse_uid(&uid)?;
    let status: ItemStatus = body.status.parse()?;

    let changes = ItemChanges {
        status: Some(status),
        ..ItemChanges::default()
    };
    let (item, diff) = state.store.update_item(&uid, changes)?;

    if let [change] = diff.as_slice() {
        let from = change.old.as_deref().unwrap_or_default();
        tracing::info!(user_id = %auth.user_id, uid = %uid, status = %status, "Status changed");

        let entry = NewAuditEntry::new(
            Some(auth.user_id),
            Some(&item),
            AuditAction::StatusChange,
            Some(format!("Status changed from {from} to {status}")),
            None,
        )
        .with_values(change.old.clone(), change.new.clone());
        state.audit.record_entry(entry);
    }

    Ok(Json(ItemResponse::from(&item)))
}

/// Project assignment request. A null or empty project unassigns.
#[derive(Debug, Deserialize)]
pub struct AssignProjectRequest {
    /// Project name.
    #[serde(default)]
    pub project: Option<String>,
}

/// Assign an item to a project, or remove it from its project.
pub async fn assign_project(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(uid): Path<String>,
    Json(body): Json<AssignProjectRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let uid = parse_uid(&uid)?;
    let target = body
        .project
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let changes = ItemChanges {
        project: Some(target.clone().unwrap_or_default()),
        ..ItemChanges::default()
    };
    let (item, diff) = state.store.update_item(&uid, changes)?;

    if let [change] = diff.as_slice() {
        let (action, details) = match (&target, change.old.as_deref()) {
            (Some(project), _) => (
                AuditAction::AssignedToProject,
                format!("Assigned to project {project}"),
            ),
            (None, old) => (
                AuditAction::UnassignedFromProject,
                format!("Removed from project {}", old.unwrap_or_default()),
            ),
        };
        tracing::info!(user_id = %auth.user_id, uid = %uid, action = %action, "Project assignment changed");

        let entry = NewAuditEntry::new(Some(auth.user_id), Some(&item), action, Some(details), None)
            .with_values(change.old.clone(), change.new.clone());
        state.audit.record_entry(entry);
    }

    Ok(Json(ItemResponse::from(&item)))
}

// ============================================================================
// Remove
// ============================================================================

/// Quantity reduction request.
#[derive(Debug, Deserialize)]
pub struct ReduceQuantityRequest {
    /// Units to remove, at least 1.
    pub quantity: u32,
    /// Why the units are being removed.
    pub reason: String,
}

/// Quantity reduction response.
#[derive(Debug, Serialize)]
pub struct ReduceQuantityResponse {
    /// Whether the item was deleted because nothing remained.
    pub deleted: bool,
    /// The item after the reduction (quantity 0 when deleted).
    pub item: ItemResponse,
}

/// Remove part of an item's quantity, deleting it when none remain.
pub async fn reduce_quantity(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(uid): Path<String>,
    Json(body): Json<ReduceQuantityRequest>,
) -> Result<Json<ReduceQuantityResponse>, ApiError> {
    let uid = parse_uid(&uid)?;
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::BadRequest("reason must not be empty".into()));
    }

    let outcome = state.store.reduce_quantity(&uid, body.quantity)?;

    let response = match outcome {
        QuantityReduction::Reduced(item) => {
            tracing::info!(
                user_id = %auth.user_id,
                uid = %uid,
                removed = body.quantity,
                remaining = item.quantity,
                "Quantity reduced"
            );

            let before = item.quantity + body.quantity;
            let entry = NewAuditEntry::new(
                Some(auth.user_id),
                Some(&item),
                AuditAction::QuantityReduced,
                Some(format!(
                    "Reduced quantity by {}: {reason} (UID: {uid})",
                    body.quantity
                )),
                None,
            )
            .with_values(Some(before.to_string()), Some(item.quantity.to_string()));
            state.audit.record_entry(entry);

            ReduceQuantityResponse {
                deleted: false,
                item: ItemResponse::from(&item),
            }
        }
        QuantityReduction::Deleted(item) => {
            tracing::info!(
                user_id = %auth.user_id,
                uid = %uid,
                removed = body.quantity,
                "Last units removed, item deleted"
            );

            let uid_text = uid.to_string();
            state.audit.record(
                Some(auth.user_id),
                None,
                AuditAction::Deleted,
                Some(format!(
                    "Removed remaining {} units of {}: {reason} (UID: {uid})",
                    body.quantity, item.item_name
                )),
                Some(&uid_text),
            );

            ReduceQuantityResponse {
                deleted: true,
                item: ItemResponse::from(&item),
            }
        }
    };

    Ok(Json(response))
}

/// Delete an item outright. Its UID is never reissued.
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(uid): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let uid = parse_uid(&uid)?;
    let item = state.store.delete_item(&uid)?;

    tracing::info!(user_id = %auth.user_id, uid = %uid, "Item deleted");

    let uid_text = uid.to_string();
    state.audit.record(
        Some(auth.user_id),
        None,
        AuditAction::Deleted,
        Some(format!("Deleted {} (UID: {uid})", item.item_name)),
        Some(&uid_text),
    );

    Ok(Json(serde_json::json!({ "deleted": true, "uid_no": uid_text })))
}
