//! Benchmark utilities.
//!
//! Run with `cargo bench -p roledb_bench`.

use rand::Rng;
use roledb_core::{EntityId, RecordStore, StoreConfig};
use roledb_storage::InMemoryBackend;

/// Generate random payload data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Opens a store over an empty in-memory backend.
pub fn memory_store(config: StoreConfig) -> RecordStore {
    RecordStore::open_with_backend(Box::new(InMemoryBackend::new()), config)
        .expect("in-memory store")
}

/// Fills an in-memory store with `count` records of `size` bytes.
pub fn populated(count: usize, size: usize, config: StoreConfig) -> (RecordStore, Vec<EntityId>) {
    let store = memory_store(config);
    let keys: Vec<EntityId> = (0..count).map(|_| EntityId::random()).collect();
    for key in &keys {
        store
            .put(*key, &random_data(size))
            .expect("populate store");
    }
    (store, keys)
}
