//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.
//!
//! Plain reads go straight to the database. Anything that reads a value and
//! writes a value derived from it (sequence counters, quantities, the audit
//! id) holds `write_lock` from the read until the `WriteBatch` is committed.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use inventory_core::{
    AuditEntryId, AuditLogEntry, Category, FieldChange, InventoryItem, ItemChanges, ItemFilter,
    InventoryError, ItemId, ItemIdGenerator, Location, NewAuditEntry, NewItem, Project,
    SequenceCounter, Uid, YearMonth,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{remaining_after, QuantityReduction, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Serializes read-modify-write; guards the item ID generator too.
    write_lock: Mutex<ItemIdGenerator>,
}

#[allow(clippy::needless_pass_by_value)]
fn db_error(e: rocksdb::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(db_error)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(ItemIdGenerator::new()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ItemIdGenerator>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::lock_poisoned())
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_value<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(db_error)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn exists(&self, cf_name: &str, key: &[u8]) -> Result<bool> {
        let cf = self.cf(cf_name)?;
        Ok(self.db.get_pinned_cf(&cf, key).map_err(db_error)?.is_some())
    }

    fn item_id_for(&self, uid: &Uid) -> Result<Option<ItemId>> {
        let cf = self.cf(cf::ITEMS_BY_UID)?;
        let Some(raw) = self
            .db
            .get_cf(&cf, keys::uid_key(&uid.to_string()))
            .map_err(db_error)?
        else {
            return Ok(None);
        };
        keys::decode_item_id(&raw)
            .map(Some)
            .ok_or_else(|| StoreError::Serialization(format!("bad item id in UID index for {uid}")))
    }

    fn require_item(&self, uid: &Uid) -> Result<InventoryItem> {
        let id = self
            .item_id_for(uid)?
            .ok_or_else(|| StoreError::item_not_found(uid))?;
        self.get_item(&id)?
            .ok_or_else(|| StoreError::item_not_found(uid))
    }

    fn check_references(&self, location: Option<&str>, project: Option<&str>) -> Result<()> {
        if let Some(name) = location.map(str::trim).filter(|s| !s.is_empty()) {
            if !self.exists(cf::LOCATIONS, name.as_bytes())? {
                return Err(StoreError::UnknownReference {
                    entity: "location",
                    name: name.to_string(),
                });
            }
        }
        if let Some(name) = project.map(str::trim).filter(|s| !s.is_empty()) {
            if !self.exists(cf::PROJECTS, name.as_bytes())? {
                return Err(StoreError::UnknownReference {
                    entity: "project",
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Read and bump the counter. The caller must hold `write_lock` and
    /// persist the returned counter in the same batch as anything using the UID.
    fn next_sequence(
        &self,
        category: Category,
        year_month: YearMonth,
    ) -> Result<(Uid, SequenceCounter)> {
        let mut counter = self
            .get_sequence(category, year_month)?
            .unwrap_or_else(|| SequenceCounter::new(category, year_month));

        let sequence = counter
            .increment()
            .ok_or_else(|| StoreError::SequenceExhausted {
                prefix: category.prefix().to_string(),
                year_month: year_month.to_string(),
            })?;

        Ok((Uid::new(category, year_month, sequence), counter))
    }

    fn put_catalog<T: serde::Serialize>(
        &self,
        cf_name: &str,
        entity: &'static str,
        name: &str,
        value: &T,
    ) -> Result<()> {
        let _guard = self.lock()?;
        if self.exists(cf_name, name.as_bytes())? {
            return Err(StoreError::Conflict {
                entity,
                id: name.to_string(),
            });
        }
        let cf = self.cf(cf_name)?;
        self.db
            .put_cf(&cf, name.as_bytes(), Self::serialize(value)?)
            .map_err(db_error)
    }

    fn list_catalog<T: serde::de::DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .iterator_cf(&cf, IteratorMode::Start)
            .map(|entry| {
                let (_, value) = entry.map_err(db_error)?;
                Self::deserialize(&value)
            })
            .collect()
    }

    /// Drop the item reference from entries whose item no longer exists.
    fn resolve_item_ref(&self, mut entry: AuditLogEntry) -> Result<AuditLogEntry> {
        if let Some(id) = entry.item_id {
            if !self.exists(cf::ITEMS, &keys::item_key(&id))? {
                entry.item_id = None;
            }
        }
        Ok(entry)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // UID Sequences
    // =========================================================================

    fn allocate_uid(&self, category: Category, year_month: YearMonth) -> Result<Uid> {
        let _guard = self.lock()?;
        let (uid, counter) = self.next_sequence(category, year_month)?;

        let cf = self.cf(cf::SEQUENCES)?;
        self.db
            .put_cf(
                &cf,
                keys::sequence_key(category, year_month),
                Self::serialize(&counter)?,
            )
            .map_err(db_error)?;

        tracing::debug!(uid = %uid, "UID allocated");
        Ok(uid)
    }

    fn get_sequence(
        &self,
        category: Category,
        year_month: YearMonth,
    ) -> Result<Option<SequenceCounter>> {
        self.get_value(cf::SEQUENCES, &keys::sequence_key(category, year_month))
    }

    // =========================================================================
    // Item Operations
    // =========================================================================

    fn create_item(&self, new: NewItem, year_month: YearMonth) -> Result<InventoryItem> {
        new.validate()?;

        let mut item_ids = self.lock()?;
        self.check_references(new.location.as_deref(), new.project.as_deref())?;

        let category = new.category;
        let (uid, counter) = self.next_sequence(category, year_month)?;
        let uid_key = keys::uid_key(&uid.to_string());
        if self.exists(cf::ITEMS_BY_UID, &uid_key)? {
            return Err(StoreError::Conflict {
                entity: "item",
                id: uid.to_string(),
            });
        }

        let id = item_ids.next_id().map_err(InventoryError::from)?;
        let item = InventoryItem::from_new(new, id, uid, Utc::now());

        let cf_sequences = self.cf(cf::SEQUENCES)?;
        let cf_items = self.cf(cf::ITEMS)?;
        let cf_by_uid = self.cf(cf::ITEMS_BY_UID)?;

        let item_key = keys::item_key(&item.id);

        // Counter, item and index land together or not at all.
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_sequences,
            keys::sequence_key(category, year_month),
            Self::serialize(&counter)?,
        );
        batch.put_cf(&cf_items, &item_key, Self::serialize(&item)?);
        batch.put_cf(&cf_by_uid, &uid_key, &item_key);

        self.db.write(batch).map_err(db_error)?;

        tracing::debug!(uid = %item.uid_no, id = %item.id, "Item stored with fresh UID");
        Ok(item)
    }

    fn get_item(&self, id: &ItemId) -> Result<Option<InventoryItem>> {
        self.get_value(cf::ITEMS, &keys::item_key(id))
    }

    fn get_item_by_uid(&self, uid: &Uid) -> Result<Option<InventoryItem>> {
        match self.item_id_for(uid)? {
            Some(id) => self.get_item(&id),
            None => Ok(None),
        }
    }

    fn list_items(
        &self,
        filter: &ItemFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<InventoryItem>> {
        let cf = self.cf(cf::ITEMS)?;

        let mut items = Vec::new();
        let mut skipped = 0;

        // ULID keys sort by creation time; iterate from the end for newest first.
        for entry in self.db.iterator_cf(&cf, IteratorMode::End) {
            if items.len() >= limit {
                break;
            }

            let (_, value) = entry.map_err(db_error)?;
            let item: InventoryItem = Self::deserialize(&value)?;

            if !filter.matches(&item) {
                continue;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }

            items.push(item);
        }

        Ok(items)
    }

    fn update_item(
        &self,
        uid: &Uid,
        changes: ItemChanges,
    ) -> Result<(InventoryItem, Vec<FieldChange>)> {
        let _guard = self.lock()?;
        let mut item = self.require_item(uid)?;
        self.check_references(changes.target_location(), changes.target_project())?;

        let diff = item.apply(changes, Utc::now())?;
        if !diff.is_empty() {
            let cf = self.cf(cf::ITEMS)?;
            self.db
                .put_cf(&cf, keys::item_key(&item.id), Self::serialize(&item)?)
                .map_err(db_error)?;
        }

        Ok((item, diff))
    }

    fn reduce_quantity(&self, uid: &Uid, quantity: u32) -> Result<QuantityReduction> {
        let _guard = self.lock()?;
        let mut item = self.require_item(uid)?;

        let remaining = remaining_after(&item, quantity)?;
        item.quantity = remaining;
        item.updated_at = Utc::now();

        let cf_items = self.cf(cf::ITEMS)?;
        let item_key = keys::item_key(&item.id);

        if remaining == 0 {
            let cf_by_uid = self.cf(cf::ITEMS_BY_UID)?;
            let mut batch = WriteBatch::default();
            batch.delete_cf(&cf_items, &item_key);
            batch.delete_cf(&cf_by_uid, keys::uid_key(&uid.to_string()));
            self.db.write(batch).map_err(db_error)?;
            Ok(QuantityReduction::Deleted(item))
        } else {
            self.db
                .put_cf(&cf_items, &item_key, Self::serialize(&item)?)
                .map_err(db_error)?;
            Ok(QuantityReduction::Reduced(item))
        }
    }

    fn delete_item(&self, uid: &Uid) -> Result<InventoryItem> {
        let _guard = self.lock()?;
        let item = self.require_item(uid)?;

        let cf_items = self.cf(cf::ITEMS)?;
        let cf_by_uid = self.cf(cf::ITEMS_BY_UID)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_items, keys::item_key(&item.id));
        batch.delete_cf(&cf_by_uid, keys::uid_key(&uid.to_string()));
        self.db.write(batch).map_err(db_error)?;

        Ok(item)
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    fn put_location(&self, location: &Location) -> Result<()> {
        self.put_catalog(cf::LOCATIONS, "location", &location.name, location)
    }

    fn list_locations(&self) -> Result<Vec<Location>> {
        self.list_catalog(cf::LOCATIONS)
    }

    fn put_project(&self, project: &Project) -> Result<()> {
        self.put_catalog(cf::PROJECTS, "project", &project.name, project)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.list_catalog(cf::PROJECTS)
    }

    // =========================================================================
    // Audit Log Operations
    // =========================================================================

    fn append_audit_entry(&self, entry: NewAuditEntry) -> Result<AuditLogEntry> {
        let _guard = self.lock()?;

        let cf_meta = self.cf(cf::META)?;
        let cf_audit = self.cf(cf::AUDIT_LOG)?;
        let cf_by_uid = self.cf(cf::AUDIT_BY_UID)?;

        let last = match self.db.get_cf(&cf_meta, keys::LAST_AUDIT_ID).map_err(db_error)? {
            Some(raw) => keys::decode_audit_id(&raw)
                .ok_or_else(|| StoreError::Serialization("bad last audit id".into()))?
                .get(),
            None => 0,
        };
        let id = AuditEntryId::new(last + 1);
        let written = AuditLogEntry::from_new(id, entry);

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_meta, keys::LAST_AUDIT_ID, id.to_be_bytes());
        batch.put_cf(&cf_audit, keys::audit_key(id), Self::serialize(&written)?);
        if let Some(uid) = &written.uid_no {
            batch.put_cf(&cf_by_uid, keys::audit_uid_key(uid, id), []); // Index entry (empty value)
        }

        self.db.write(batch).map_err(db_error)?;

        Ok(written)
    }

    fn list_audit_entries(
        &self,
        uid: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditLogEntry>> {
        let Some(uid) = uid else {
            let cf = self.cf(cf::AUDIT_LOG)?;
            return self
                .db
                .iterator_cf(&cf, IteratorMode::End)
                .skip(offset)
                .take(limit)
                .map(|entry| {
                    let (_, value) = entry.map_err(db_error)?;
                    self.resolve_item_ref(Self::deserialize(&value)?)
                })
                .collect();
        };

        let cf_by_uid = self.cf(cf::AUDIT_BY_UID)?;
        let prefix = keys::audit_uid_prefix(uid);

        // Collect the matching index keys, then walk them newest first.
        let mut ids = Vec::new();
        for item in self
            .db
            .iterator_cf(&cf_by_uid, IteratorMode::From(&prefix, Direction::Forward))
        {
            let (key, _) = item.map_err(db_error)?;
            if !key.starts_with(&prefix) {
                break;
            }
            if let Some(id) = keys::extract_audit_id_from_uid_key(&key) {
                ids.push(id);
            }
        }
        ids.reverse();

        let mut entries = Vec::new();
        for id in ids.into_iter().skip(offset).take(limit) {
            if let Some(entry) = self.get_value::<AuditLogEntry>(cf::AUDIT_LOG, &keys::audit_key(id))? {
                entries.push(self.resolve_item_ref(entry)?);
            }
        }

        Ok(entries)
    }
}
