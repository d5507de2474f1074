//! Inventory item types.
//!
//! This module defines the item record, the create/edit payloads, field-level
//! change tracking, and the list filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InventoryError;
use crate::{Category, ItemId, Uid};

/// Quantity used when a new item does not specify one.
pub const DEFAULT_QUANTITY: u32 = 1;

/// A tracked piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Storage identifier.
    pub id: ItemId,

    /// Human-readable UID. Assigned once at creation, never changed.
    pub uid_no: Uid,

    /// Category that determined the UID prefix.
    pub category: Category,

    /// Display name.
    pub item_name: String,

    /// Manufacturer serial number.
    pub serial_number: Option<String>,

    /// Name of the registered location holding the item.
    pub location: Option<String>,

    /// Name of the registered project the item is assigned to.
    pub project: Option<String>,

    /// Lifecycle status.
    pub status: ItemStatus,

    /// Units on hand. The item is deleted when this reaches zero.
    pub quantity: u32,

    /// Free-text description.
    pub description: Option<String>,

    /// Reference to an attached document.
    pub document: Option<String>,

    /// Reference to an attached image.
    pub image: Option<String>,

    /// CPU model, for computers.
    pub cpu: Option<String>,

    /// GPU model, for computers.
    pub gpu: Option<String>,

    /// Operating system.
    pub os: Option<String>,

    /// Installed software, free text.
    pub installed_software: Option<String>,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Build a stored item from a validated create payload and its freshly allocated UID.
    #[must_use]
    pub fn from_new(new: NewItem, id: ItemId, uid_no: Uid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            uid_no,
            category: new.category,
            item_name: new.item_name.trim().to_string(),
            serial_number: non_empty(new.serial_number),
            location: non_empty(new.location),
            project: non_empty(new.project),
            status: new.status,
            quantity: new.quantity,
            description: non_empty(new.description),
            document: non_empty(new.document),
            image: non_empty(new.image),
            cpu: non_empty(new.cpu),
            gpu: non_empty(new.gpu),
            os: non_empty(new.os),
            installed_software: non_empty(new.installed_software),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit and return the fields that actually changed.
    ///
    /// `updated_at` is only bumped when something changed. The UID, id and
    /// category are not editable.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Validation` if the edit would leave the item
    /// without a name or with zero quantity. The item is untouched on error.
    pub fn apply(
        &mut self,
        changes: ItemChanges,
        now: DateTime<Utc>,
    ) -> Result<Vec<FieldChange>, InventoryError> {
        changes.validate()?;

        let mut diff = Vec::new();

        if let Some(name) = changes.item_name {
            let name = name.trim().to_string();
            if name != self.item_name {
                diff.push(FieldChange::new(
                    "item_name",
                    Some(self.item_name.clone()),
                    Some(name.clone()),
                ));
                self.item_name = name;
            }
        }

        if let Some(status) = changes.status {
            if status != self.status {
                diff.push(FieldChange::new(
                    "status",
                    Some(self.status.to_string()),
                    Some(status.to_string()),
                ));
                self.status = status;
            }
        }

        if let Some(quantity) = changes.quantity {
            if quantity != self.quantity {
                diff.push(FieldChange::new(
                    "quantity",
                    Some(self.quantity.to_string()),
                    Some(quantity.to_string()),
                ));
                self.quantity = quantity;
            }
        }

        let text_fields: [(&'static str, Option<String>, &mut Option<String>); 10] = [
            ("serial_number", changes.serial_number, &mut self.serial_number),
            ("location", changes.location, &mut self.location),
            ("project", changes.project, &mut self.project),
            ("description", changes.description, &mut self.description),
            ("document", changes.document, &mut self.document),
            ("image", changes.image, &mut self.image),
            ("cpu", changes.cpu, &mut self.cpu),
            ("gpu", changes.gpu, &mut self.gpu),
            ("os", changes.os, &mut self.os),
            (
                "installed_software",
                changes.installed_software,
                &mut self.installed_software,
            ),
        ];

        for (field, incoming, current) in text_fields {
            // Absent leaves the field alone; an empty string clears it.
            let Some(incoming) = incoming else { continue };
            let incoming = non_empty(Some(incoming));
            if incoming != *current {
                diff.push(FieldChange::new(field, current.clone(), incoming.clone()));
                *current = incoming;
            }
        }

        if !diff.is_empty() {
            self.updated_at = now;
        }

        Ok(diff)
    }
}

/// Lifecycle status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// In stock and unassigned.
    #[default]
    Available,
    /// Issued to someone.
    InUse,
    /// Out for repair.
    InRepair,
    /// Written off.
    Disposed,
    /// Moving between locations.
    InTransit,
}

impl ItemStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 5] = [
        Self::Available,
        Self::InUse,
        Self::InRepair,
        Self::Disposed,
        Self::InTransit,
    ];

    /// Human label, as shown in exports and audit details.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::InUse => "In Use",
            Self::InRepair => "In Repair",
            Self::Disposed => "Disposed",
            Self::InTransit => "In Transit",
        }
    }

    const fn code(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::InUse => "in_use",
            Self::InRepair => "in_repair",
            Self::Disposed => "disposed",
            Self::InTransit => "in_transit",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ItemStatus {
    type Err = InventoryError;

    /// Accepts either the snake-case code (`in_use`) or the label (`In Use`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.code() == s || status.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| InventoryError::InvalidStatus(s.to_string()))
    }
}

/// Payload for creating an item. The UID is allocated by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewItem {
    /// Category. Unknown labels fall back to `Other`.
    pub category: Category,
    /// Display name (required).
    pub item_name: String,
    /// Serial number.
    pub serial_number: Option<String>,
    /// Location name; must be registered.
    pub location: Option<String>,
    /// Project name; must be registered.
    pub project: Option<String>,
    /// Initial status.
    pub status: ItemStatus,
    /// Units on hand, at least 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Free-text description.
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
}

fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

impl NewItem {
    /// A minimal payload with a name and category.
    #[must_use]
    pub fn new(category: Category, item_name: impl Into<String>) -> Self {
        Self {
            category,
            item_name: item_name.into(),
            quantity: DEFAULT_QUANTITY,
            ..Self::default()
        }
    }

    /// Check the fields the store cannot check itself.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Validation` for an empty name or zero quantity.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.item_name.trim().is_empty() {
            return Err(InventoryError::validation("item_name", "must not be empty"));
        }
        if self.quantity == 0 {
            return Err(InventoryError::validation("quantity", "must be at least 1"));
        }
        Ok(())
    }
}

/// Payload for editing an item. `None` leaves a field unchanged.
///
/// For optional text fields an empty string clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemChanges {
    /// New name.
    pub item_name: Option<String>,
    /// New serial number.
    pub serial_number: Option<String>,
    /// New location name.
    pub location: Option<String>,
    /// New project name.
    pub project: Option<String>,
    /// New status.
    pub status: Option<ItemStatus>,
    /// New quantity.
    pub quantity: Option<u32>,
    /// New description.
    pub description: Option<String>,
    /// New document reference.
    pub document: Option<String>,
    /// New image reference.
    pub image: Option<String>,
    /// New CPU model.
    pub cpu: Option<String>,
    /// New GPU model.
    pub gpu: Option<String>,
    /// New operating system.
    pub os: Option<String>,
    /// New installed software.
    pub installed_software: Option<String>,
}

impl ItemChanges {
    fn validate(&self) -> Result<(), InventoryError> {
        if self
            .item_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(InventoryError::validation("item_name", "must not be empty"));
        }
        if self.quantity == Some(0) {
            return Err(InventoryError::validation(
                "quantity",
                "must be at least 1; reduce the quantity to remove an item",
            ));
        }
        Ok(())
    }

    /// The location this edit moves the item to, if it sets a non-empty one.
    #[must_use]
    pub fn target_location(&self) -> Option<&str> {
        self.location.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// The project this edit assigns, if it sets a non-empty one.
    #[must_use]
    pub fn target_project(&self) -> Option<&str> {
        self.project.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// One changed field, as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    /// Field name.
    pub field: &'static str,
    /// Value before the edit.
    pub old: Option<String>,
    /// Value after the edit.
    pub new: Option<String>,
}

impl FieldChange {
    fn new(field: &'static str, old: Option<String>, new: Option<String>) -> Self {
        Self { field, old, new }
    }
}

/// Filter for listing and exporting items. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemFilter {
    /// Exact item name.
    pub item_name: Option<String>,
    /// Exact status.
    pub status: Option<ItemStatus>,
    /// Exact location name.
    pub location: Option<String>,
    /// Exact category.
    pub category: Option<Category>,
    /// Case-insensitive substring of the name, UID or serial number.
    pub search: Option<String>,
}

impl ItemFilter {
    /// Whether `item` passes every set criterion.
    #[must_use]
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(name) = non_empty_ref(self.item_name.as_deref()) {
            if item.item_name != name {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != item.status) {
            return false;
        }
        if let Some(location) = non_empty_ref(self.location.as_deref()) {
            if item.location.as_deref() != Some(location) {
                return false;
            }
        }
        if self.category.is_some_and(|c| c != item.category) {
            return false;
        }
        if let Some(needle) = non_empty_ref(self.search.as_deref()) {
            let needle = needle.to_lowercase();
            let hit = item.item_name.to_lowercase().contains(&needle)
                || item.uid_no.to_string().to_lowercase().contains(&needle)
                || item
                    .serial_number
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn non_empty_ref(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::YearMonth;

    fn sample_item() -> InventoryItem {
        let mut new = NewItem::new(Category::Laptop, "ThinkPad X1");
        new.serial_number = Some("SN-123".into());
        new.location = Some("HQ".into());
        let uid = Uid::new(Category::Laptop, YearMonth::new(25, 7).unwrap(), 1);
        InventoryItem::from_new(new, ItemId::generate(), uid, Utc::now())
    }

    #[test]
    fn new_item_validation() {
        assert!(NewItem::new(Category::Laptop, "ok").validate().is_ok());
        assert!(NewItem::new(Category::Laptop, "  ").validate().is_err());

        let mut zero = NewItem::new(Category::Laptop, "ok");
        zero.quantity = 0;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn new_item_json_defaults() {
        let new: NewItem = serde_json::from_str(r#"{"item_name": "Dell U2720Q"}"#).unwrap();
        assert_eq!(new.quantity, DEFAULT_QUANTITY);
        assert_eq!(new.status, ItemStatus::Available);
        assert_eq!(new.category, Category::Other);
    }

    #[test]
    fn from_new_blanks_become_none() {
        let mut new = NewItem::new(Category::Monitor, " Dell ");
        new.serial_number = Some("   ".into());
        let uid = Uid::new(Category::Monitor, YearMonth::new(25, 7).unwrap(), 3);
        let item = InventoryItem::from_new(new, ItemId::generate(), uid, Utc::now());
        assert_eq!(item.item_name, "Dell");
        assert!(item.serial_number.is_none());
    }

    #[test]
    fn apply_reports_only_changed_fields() {
        let mut item = sample_item();
        let before = item.updated_at;
        let changes = ItemChanges {
            item_name: Some("ThinkPad X1".into()),
            status: Some(ItemStatus::InUse),
            cpu: Some("i7".into()),
            ..ItemChanges::default()
        };

        let later = before + chrono::Duration::seconds(5);
        let diff = item.apply(changes, later).unwrap();

        let fields: Vec<_> = diff.iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["status", "cpu"]);
        assert_eq!(diff[0].old.as_deref(), Some("Available"));
        assert_eq!(diff[0].new.as_deref(), Some("In Use"));
        assert_eq!(item.updated_at, later);
    }

    #[test]
    fn apply_empty_string_clears_field() {
        let mut item = sample_item();
        let diff = item
            .apply(
                ItemChanges {
                    serial_number: Some(String::new()),
                    ..ItemChanges::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].old.as_deref(), Some("SN-123"));
        assert!(diff[0].new.is_none());
        assert!(item.serial_number.is_none());
    }

    #[test]
    fn apply_noop_keeps_timestamp() {
        let mut item = sample_item();
        let before = item.updated_at;
        let diff = item
            .apply(ItemChanges::default(), before + chrono::Duration::seconds(1))
            .unwrap();
        assert!(diff.is_empty());
        assert_eq!(item.updated_at, before);
    }

    #[test]
    fn apply_rejects_zero_quantity_without_mutating() {
        let mut item = sample_item();
        let result = item.apply(
            ItemChanges {
                item_name: Some("renamed".into()),
                quantity: Some(0),
                ..ItemChanges::default()
            },
            Utc::now(),
        );
        assert!(result.is_err());
        assert_eq!(item.item_name, "ThinkPad X1");
    }

    #[test]
    fn status_parses_codes_and_labels() {
        assert_eq!("in_use".parse::<ItemStatus>().unwrap(), ItemStatus::InUse);
        assert_eq!("In Repair".parse::<ItemStatus>().unwrap(), ItemStatus::InRepair);
        assert!("broken".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn filter_matches_fields_and_search() {
        let item = sample_item();

        assert!(ItemFilter::default().matches(&item));
        assert!(ItemFilter {
            location: Some("HQ".into()),
            status: Some(ItemStatus::Available),
            ..ItemFilter::default()
        }
        .matches(&item));
        assert!(!ItemFilter {
            location: Some("Warehouse".into()),
            ..ItemFilter::default()
        }
        .matches(&item));

        for needle in ["thinkpad", "lap-2507", "sn-1"] {
            assert!(ItemFilter {
                search: Some(needle.into()),
                ..ItemFilter::default()
            }
            .matches(&item));
        }
        assert!(!ItemFilter {
            search: Some("macbook".into()),
            ..ItemFilter::default()
        }
        .matches(&item));
    }
}
