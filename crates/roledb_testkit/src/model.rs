//! Reference model for record store behavior.

use crate::generators::StoreOp;
use roledb_core::{EntityId, RecordStore, HEADER_SIZE};
use std::collections::HashMap;

/// In-memory map with the observable behavior of a record store.
#[derive(Debug, Default, Clone)]
pub struct ModelStore {
    records: HashMap<EntityId, Vec<u8>>,
}

impl ModelStore {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a payload.
    pub fn put(&mut self, key: EntityId, payload: &[u8]) {
        self.records.insert(key, payload.to_vec());
    }

    /// Removes a record, returning whether it existed.
    pub fn remove(&mut self, key: EntityId) -> bool {
        self.records.remove(&key).is_some()
    }

    /// Returns the payload for a key.
    pub fn get(&self, key: EntityId) -> Option<&[u8]> {
        self.records.get(&key).map(Vec::as_slice)
    }

    /// Folds in the records of a model that tracked a disjoint key set.
    pub fn absorb(&mut self, other: ModelStore) {
        self.records.extend(other.records);
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the model holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// File size a packed store holding these records must have.
    pub fn expected_file_size(&self) -> u64 {
        self.records
            .values()
            .map(|p| (HEADER_SIZE + p.len()) as u64)
            .sum()
    }

    /// Applies `op` to both the model and `store`, asserting they agree.
    ///
    /// [`StoreOp::Reopen`] is ignored here; the caller owns the store's
    /// lifecycle.
    pub fn apply(&mut self, store: &RecordStore, op: &StoreOp) {
        match op {
            StoreOp::Put { key, payload } => {
                store.put(*key, payload).expect("Failed to put record");
                self.put(*key, payload);
            }
            StoreOp::Remove { key } => {
                let removed = store.remove(*key).expect("Failed to remove record");
                assert_eq!(removed, self.remove(*key), "remove result for {key}");
            }
            StoreOp::Get { key } => {
                let actual = store.get(*key).expect("Failed to get record");
                assert_eq!(actual.as_deref(), self.get(*key), "payload for {key}");
            }
            StoreOp::Reopen => {}
        }
    }

    /// Asserts that `store` holds exactly the model's records, packed.
    pub fn verify(&self, store: &RecordStore) {
        assert_eq!(store.len().expect("Failed to count records"), self.len());

        for (key, payload) in &self.records {
            let actual = store.get(*key).expect("Failed to get record");
            assert_eq!(actual.as_deref(), Some(payload.as_slice()), "payload for {key}");
        }

        assert_eq!(
            store.file_size().expect("Failed to read file size"),
            self.expected_file_size(),
            "file is not packed"
        );

        let mut expected_offset = 0;
        for info in store.scan().expect("Failed to scan records") {
            assert_eq!(info.offset, expected_offset, "gap before {}", info.key);
            assert_eq!(
                store.offset_of(info.key).expect("Failed to read offset"),
                Some(info.offset)
            );
            expected_offset = info.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_size_counts_headers() {
        let mut model = ModelStore::new();
        model.put(EntityId::from_bytes([1; 16]), b"abc");
        model.put(EntityId::from_bytes([2; 16]), b"");
        assert_eq!(model.expected_file_size(), 43);

        assert!(model.remove(EntityId::from_bytes([1; 16])));
        assert!(!model.remove(EntityId::from_bytes([1; 16])));
        assert_eq!(model.expected_file_size(), 20);
    }
}
