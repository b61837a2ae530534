//! Property-based test generators using proptest.
//!
//! Keys are drawn from a small pool by default so that random operation
//! sequences hit the update and remove paths, not just appends.

use roledb_core::EntityId;
use proptest::prelude::*;

/// Strategy for generating arbitrary entity IDs.
pub fn entity_id_strategy() -> impl Strategy<Value = EntityId> {
    prop::array::uniform16(any::<u8>()).prop_map(EntityId::from_bytes)
}

/// Strategy for picking one of `pool` fixed entity IDs.
pub fn pooled_id_strategy(pool: u8) -> impl Strategy<Value = EntityId> {
    (0..pool.max(1)).prop_map(pool_id)
}

/// The `n`th key of the pool used by [`pooled_id_strategy`].
pub fn pool_id(n: u8) -> EntityId {
    EntityId::from_u64_pair(0x726f_6c65_6462_0000, u64::from(n))
}

/// Strategy for generating payloads (arbitrary bytes, possibly empty).
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..512)
}

/// A single record store operation.
#[derive(Debug, Clone)]
pub enum StoreOp {
    /// Store a payload
    Put {
        /// Record key
        key: EntityId,
        /// Payload bytes
        payload: Vec<u8>,
    },
    /// Remove a record
    Remove {
        /// Record key
        key: EntityId,
    },
    /// Read a record
    Get {
        /// Record key
        key: EntityId,
    },
    /// Close and reopen the store
    Reopen,
}

impl StoreOp {
    /// Returns the key this operation touches, if any.
    pub fn key(&self) -> Option<EntityId> {
        match self {
            Self::Put { key, .. } | Self::Remove { key } | Self::Get { key } => Some(*key),
            Self::Reopen => None,
        }
    }
}

/// Strategy for one store operation over a pool of eight keys.
pub fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    let key = || pooled_id_strategy(8);
    prop_oneof![
        5 => (key(), payload_strategy()).prop_map(|(key, payload)| StoreOp::Put { key, payload }),
        2 => key().prop_map(|key| StoreOp::Remove { key }),
        2 => key().prop_map(|key| StoreOp::Get { key }),
        1 => Just(StoreOp::Reopen),
    ]
}

/// Strategy for a sequence of store operations.
pub fn store_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<StoreOp>> {
    prop::collection::vec(store_op_strategy(), 0..max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn pool_ids_are_distinct() {
        assert_ne!(pool_id(0), pool_id(1));
        assert_eq!(pool_id(3), pool_id(3));
    }

    #[test]
    fn generated_ops_stay_in_pool() {
        let mut runner = TestRunner::default();
        for _ in 0..64 {
            let op = store_op_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            if let Some(key) = op.key() {
                assert!((0..8).any(|n| pool_id(n) == key));
            }
        }
    }
}
