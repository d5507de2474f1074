//! In-memory storage implementation.
//!
//! All state lives behind one mutex, so every operation is trivially atomic
//! and serialized. Nothing survives a restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use inventory_core::{
    AuditEntryId, AuditLogEntry, Category, FieldChange, InventoryItem, ItemChanges, ItemFilter,
    InventoryError, ItemId, ItemIdGenerator, Location, NewAuditEntry, NewItem, Project,
    SequenceCounter, Uid, YearMonth,
};

use crate::error::{Result, StoreError};
use crate::{remaining_after, QuantityReduction, Store};

#[derive(Default)]
struct State {
    items: BTreeMap<ItemId, InventoryItem>,
    items_by_uid: HashMap<String, ItemId>,
    sequences: HashMap<(&'static str, YearMonth), SequenceCounter>,
    audit_log: Vec<AuditLogEntry>,
    item_ids: ItemIdGenerator,
    locations: BTreeMap<String, Location>,
    projects: BTreeMap<String, Project>,
}

impl State {
    fn next_uid(&mut self, category: Category, year_month: YearMonth) -> Result<Uid> {
        let counter = self
            .sequences
            .entry((category.prefix(), year_month))
            .or_insert_with(|| SequenceCounter::new(category, year_month));

        let sequence = counter
            .increment()
            .ok_or_else(|| StoreError::SequenceExhausted {
                prefix: category.prefix().to_string(),
                year_month: year_month.to_string(),
            })?;

        Ok(Uid::new(category, year_month, sequence))
    }

    fn check_references(&self, location: Option<&str>, project: Option<&str>) -> Result<()> {
        if let Some(name) = location.map(str::trim).filter(|s| !s.is_empty()) {
            if !self.locations.contains_key(name) {
                return Err(StoreError::UnknownReference {
                    entity: "location",
                    name: name.to_string(),
                });
            }
        }
        if let Some(name) = project.map(str::trim).filter(|s| !s.is_empty()) {
            if !self.projects.contains_key(name) {
                return Err(StoreError::UnknownReference {
                    entity: "project",
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn item_id_for(&self, uid: &Uid) -> Result<ItemId> {
        self.items_by_uid
            .get(&uid.to_string())
            .copied()
            .ok_or_else(|| StoreError::item_not_found(uid))
    }

    fn remove_item(&mut self, id: ItemId) -> Option<InventoryItem> {
        let item = self.items.remove(&id)?;
        self.items_by_uid.remove(&item.uid_no.to_string());
        Some(item)
    }
}

/// Mutex-guarded in-memory storage implementation.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| StoreError::lock_poisoned())
    }
}

impl Store for MemoryStore {
    fn allocate_uid(&self, category: Category, year_month: YearMonth) -> Result<Uid> {
        let uid = self.state()?.next_uid(category, year_month)?;
        tracing::debug!(uid = %uid, "UID allocated");
        Ok(uid)
    }

    fn get_sequence(
        &self,
        category: Category,
        year_month: YearMonth,
    ) -> Result<Option<SequenceCounter>> {
        Ok(self
            .state()?
            .sequences
            .get(&(category.prefix(), year_month))
            .cloned())
    }

    fn create_item(&self, new: NewItem, year_month: YearMonth) -> Result<InventoryItem> {
        new.validate()?;

        let mut state = self.state()?;
        state.check_references(new.location.as_deref(), new.project.as_deref())?;

        let id = state.item_ids.next_id().map_err(InventoryError::from)?;
        let uid = state.next_uid(new.category, year_month)?;
        let item = InventoryItem::from_new(new, id, uid, Utc::now());

        state.items_by_uid.insert(item.uid_no.to_string(), item.id);
        state.items.insert(item.id, item.clone());

        tracing::debug!(uid = %item.uid_no, id = %item.id, "Item stored with fresh UID");
        Ok(item)
    }

    fn get_item(&self, id: &ItemId) -> Result<Option<InventoryItem>> {
        Ok(self.state()?.items.get(id).cloned())
    }

    fn get_item_by_uid(&self, uid: &Uid) -> Result<Option<InventoryItem>> {
        let state = self.state()?;
        Ok(state
            .items_by_uid
            .get(&uid.to_string())
            .and_then(|id| state.items.get(id))
            .cloned())
    }

    fn list_items(
        &self,
        filter: &ItemFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InventoryItem>> {
        Ok(self
            .state()?
            .items
            .values()
            .rev()
            .filter(|item| filter.matches(item))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn update_item(
        &self,
        uid: &Uid,
        changes: ItemChanges,
    ) -> Result<(InventoryItem, Vec<FieldChange>)> {
        let mut state = self.state()?;
        let id = state.item_id_for(uid)?;
        state.check_references(changes.target_location(), changes.target_project())?;

        let item = state
            .items
            .get_mut(&id)
            .ok_or_else(|| StoreError::item_not_found(uid))?;
        let diff = item.apply(changes, Utc::now())?;

        Ok((item.clone(), diff))
    }

    fn reduce_quantity(&self, uid: &Uid, quantity: u32) -> Result<QuantityReduction> {
        let mut state = self.state()?;
        let id = state.item_id_for(uid)?;
        let item = state
            .items
            .get_mut(&id)
            .ok_or_else(|| StoreError::item_not_found(uid))?;

        let remaining = remaining_after(item, quantity)?;
        item.quantity = remaining;
        item.updated_at = Utc::now();

        if remaining == 0 {
            let gone = state
                .remove_item(id)
                .ok_or_else(|| StoreError::item_not_found(uid))?;
            Ok(QuantityReduction::Deleted(gone))
        } else {
            Ok(QuantityReduction::Reduced(item.clone()))
        }
    }

    fn delete_item(&self, uid: &Uid) -> Result<InventoryItem> {
        let mut state = self.state()?;
        let id = state.item_id_for(uid)?;
        state
            .remove_item(id)
            .ok_or_else(|| StoreError::item_not_found(uid))
    }

    fn put_location(&self, location: &Location) -> Result<()> {
        let mut state = self.state()?;
        if state.locations.contains_key(&location.name) {
            return Err(StoreError::Conflict {
                entity: "location",
                id: location.name.clone(),
            });
        }
        state
            .locations
            .insert(location.name.clone(), location.clone());
        Ok(())
    }

    fn list_locations(&self) -> Result<Vec<Location>> {
        Ok(self.state()?.locations.values().cloned().collect())
    }

    fn put_project(&self, project: &Project) -> Result<()> {
        let mut state = self.state()?;
        if state.projects.contains_key(&project.name) {
            return Err(StoreError::Conflict {
                entity: "project",
                id: project.name.clone(),
            });
        }
        state.projects.insert(project.name.clone(), project.clone());
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.state()?.projects.values().cloned().collect())
    }

    fn append_audit_entry(&self, entry: NewAuditEntry) -> Result<AuditLogEntry> {
        let mut state = self.state()?;
        let next = state.audit_log.last().map_or(1, |last| last.id.get() + 1);
        let written = AuditLogEntry::from_new(AuditEntryId::new(next), entry);
        state.audit_log.push(written.clone());
        Ok(written)
    }

    fn list_audit_entries(
        &self,
        uid: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditLogEntry>> {
        let state = self.state()?;
        Ok(state
            .audit_log
            .iter()
            .rev()
            .filter(|entry| uid.map_or(true, |uid| entry.uid_no.as_deref() == Some(uid)))
            .skip(offset)
            .take(limit)
            .map(|entry| {
                let mut entry = entry.clone();
                entry.item_id = entry.item_id.filter(|id| state.items.contains_key(id));
                entry
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_core::{AuditAction, ItemStatus};

    fn july() -> YearMonth {
        YearMonth::new(25, 7).unwrap()
    }

    #[test]
    fn create_item_stamps_sequential_uids() {
        let store = MemoryStore::new();
        let uids: Vec<_> = (0..3)
            .map(|_| {
                store
                    .create_item(NewItem::new(Category::Laptop, "ThinkPad"), july())
                    .unwrap()
                    .uid_no
                    .to_string()
            })
            .collect();
        assert_eq!(uids, ["LAP-2507-0001", "LAP-2507-0002", "LAP-2507-0003"]);
    }

    #[test]
    fn exhausted_counter_creates_nothing() {
        let store = MemoryStore::new();
        store.allocate_uid(Category::Printer, july()).unwrap();
        store
            .state()
            .unwrap()
            .sequences
            .get_mut(&("PRN", july()))
            .unwrap()
            .last_sequence_number = u32::MAX;

        let result = store.create_item(NewItem::new(Category::Printer, "LaserJet"), july());
        assert!(matches!(result, Err(StoreError::SequenceExhausted { .. })));
        assert!(store
            .list_items(&ItemFilter::default(), 10, 0)
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .get_sequence(Category::Printer, july())
                .unwrap()
                .unwrap()
                .last_sequence_number,
            u32::MAX
        );
    }

    #[test]
    fn unknown_location_consumes_no_sequence_number() {
        let store = MemoryStore::new();
        let mut new = NewItem::new(Category::Monitor, "Dell");
        new.location = Some("Nowhere".into());

        let result = store.create_item(new, july());
        assert!(matches!(result, Err(StoreError::UnknownReference { .. })));
        assert!(store.get_sequence(Category::Monitor, july()).unwrap().is_none());
    }

    #[test]
    fn update_rejects_unknown_project() {
        let store = MemoryStore::new();
        let item = store
            .create_item(NewItem::new(Category::Server, "R740"), july())
            .unwrap();

        let result = store.update_item(
            &item.uid_no,
            ItemChanges {
                project: Some("Apollo".into()),
                status: Some(ItemStatus::InUse),
                ..ItemChanges::default()
            },
        );
        assert!(matches!(result, Err(StoreError::UnknownReference { .. })));

        let unchanged = store.get_item(&item.id).unwrap().unwrap();
        assert_eq!(unchanged.status, ItemStatus::Available);
    }

    #[test]
    fn back_to_back_creates_list_newest_first() {
        let store = MemoryStore::new();
        for n in 0..200 {
            store
                .create_item(NewItem::new(Category::Laptop, format!("Laptop {n}")), july())
                .unwrap();
        }

        let items = store.list_items(&ItemFilter::default(), 500, 0).unwrap();
        let sequences: Vec<u32> = items.iter().map(|i| i.uid_no.sequence()).collect();
        assert_eq!(sequences, (1..=200).rev().collect::<Vec<_>>());
    }

    #[test]
    fn audit_ids_follow_write_order() {
        let store = MemoryStore::new();
        for action in [AuditAction::Login, AuditAction::Exported, AuditAction::Logout] {
            store
                .append_audit_entry(NewAuditEntry::new(None, None, action, None, None))
                .unwrap();
        }
        let entries = store.list_audit_entries(None, 10, 0).unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.get()).collect();
        assert_eq!(ids, [3, 2, 1]);
        assert_eq!(entries[0].action, AuditAction::Logout);
    }
}
