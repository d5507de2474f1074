//! Concurrent UID allocation tests.
//!
//! Many threads hammer the same (category, month) key; the result must be
//! exactly N distinct, gap-free sequence numbers.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use inventory_core::{Category, ItemFilter, NewItem, YearMonth};
use inventory_store::{MemoryStore, Store};

const THREADS: usize = 8;
const PER_THREAD: usize = 25;

fn july() -> YearMonth {
    YearMonth::new(25, 7).unwrap()
}

fn allocate_concurrently(store: Arc<dyn Store>) -> Vec<u32> {
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|_| store.allocate_uid(Category::Laptop, july()).unwrap().sequence())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect()
}

fn create_concurrently(store: Arc<dyn Store>) -> Vec<u32> {
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| {
                        store
                            .create_item(NewItem::new(Category::Monitor, format!("m-{t}-{i}")), july())
                            .unwrap()
                            .uid_no
                            .sequence()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect()
}

fn assert_gap_free(sequences: &[u32]) {
    let total = THREADS * PER_THREAD;
    assert_eq!(sequences.len(), total);

    let distinct: BTreeSet<_> = sequences.iter().copied().collect();
    assert_eq!(distinct.len(), total, "duplicate sequence numbers issued");

    let expected: BTreeSet<u32> = (1..=u32::try_from(total).unwrap()).collect();
    assert_eq!(distinct, expected, "sequence has gaps");
}

#[test]
fn memory_store_concurrent_allocation_is_gap_free() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    assert_gap_free(&allocate_concurrently(store));
}

#[test]
fn memory_store_concurrent_creation_is_gap_free() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let sequences = create_concurrently(Arc::clone(&store));
    assert_gap_free(&sequences);

    let items = store
        .list_items(&ItemFilter::default(), usize::MAX, 0)
        .unwrap();
    assert_eq!(items.len(), THREADS * PER_THREAD);
}

#[test]
fn categories_and_months_are_independent() {
    let store = MemoryStore::new();
    let june = YearMonth::new(25, 6).unwrap();

    let lap_july = store.allocate_uid(Category::Laptop, july()).unwrap();
    let mon_july = store.allocate_uid(Category::Monitor, july()).unwrap();
    let lap_june = store.allocate_uid(Category::Laptop, june).unwrap();
    let lap_july_2 = store.allocate_uid(Category::Laptop, july()).unwrap();

    assert_eq!(lap_july.to_string(), "LAP-2507-0001");
    assert_eq!(mon_july.to_string(), "MON-2507-0001");
    assert_eq!(lap_june.to_string(), "LAP-2506-0001");
    assert_eq!(lap_july_2.to_string(), "LAP-2507-0002");
}

#[cfg(feature = "rocksdb-backend")]
mod rocks {
    use super::*;
    use inventory_store::RocksStore;
    use tempfile::TempDir;

    #[test]
    fn rocks_store_concurrent_allocation_is_gap_free() {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn Store> = Arc::new(RocksStore::open(dir.path()).unwrap());
        assert_gap_free(&allocate_concurrently(Arc::clone(&store)));

        let counter = store.get_sequence(Category::Laptop, july()).unwrap().unwrap();
        assert_eq!(
            counter.last_sequence_number,
            u32::try_from(THREADS * PER_THREAD).unwrap()
        );
    }

    #[test]
    fn rocks_store_concurrent_creation_is_gap_free() {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn Store> = Arc::new(RocksStore::open(dir.path()).unwrap());
        assert_gap_free(&create_concurrently(store));
    }
}
