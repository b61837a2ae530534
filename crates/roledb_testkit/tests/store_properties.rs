//! Record store behavior against real files.

use proptest::prelude::*;
use roledb_core::{CoreError, EntityId, RecordStore, StoreConfig, MAX_PAYLOAD_SIZE};
use roledb_testkit::prelude::*;
use std::sync::Arc;
use std::thread;

fn k(n: u8) -> EntityId {
    pool_id(n)
}

#[test]
fn round_trip_including_empty_and_max_payloads() {
    let store = TestStore::new();

    store.put(k(0), b"").unwrap();
    store.put(k(1), b"admin\nmoderator").unwrap();
    let max = vec![0x5a; MAX_PAYLOAD_SIZE];
    store.put(k(2), &max).unwrap();

    assert_eq!(store.get(k(0)).unwrap(), Some(Vec::new()));
    assert_eq!(store.get(k(1)).unwrap().as_deref(), Some(&b"admin\nmoderator"[..]));
    assert_eq!(store.get(k(2)).unwrap(), Some(max));
}

#[test]
fn absent_key_reads_nothing_and_removes_nothing() {
    let store = TestStore::new();
    store.put(k(1), b"abc").unwrap();
    let before = store.file_bytes();

    assert_eq!(store.get(k(9)).unwrap(), None);
    assert!(!store.remove(k(9)).unwrap());
    assert_eq!(store.file_bytes(), before);
}

#[test]
fn compaction_scenario() {
    let store = TestStore::new();
    let (k1, k2) = (k(1), k(2));

    store.put(k1, b"abc").unwrap();
    assert_eq!(store.file_size().unwrap(), 23);
    assert_eq!(store.offset_of(k1).unwrap(), Some(0));

    store.put(k2, b"xyz").unwrap();
    assert_eq!(store.offset_of(k2).unwrap(), Some(23));
    assert_eq!(store.file_size().unwrap(), 46);

    store.put(k1, b"abcde").unwrap();
    assert_eq!(store.offset_of(k1).unwrap(), Some(0));
    assert_eq!(store.offset_of(k2).unwrap(), Some(25));
    assert_eq!(store.file_size().unwrap(), 48);
    assert_eq!(store.get(k2).unwrap().as_deref(), Some(&b"xyz"[..]));

    assert!(store.remove(k1).unwrap());
    assert_eq!(store.file_size().unwrap(), 23);
    assert_eq!(store.offset_of(k2).unwrap(), Some(0));
    assert_eq!(store.get(k2).unwrap().as_deref(), Some(&b"xyz"[..]));
    assert_eq!(store.get(k1).unwrap(), None);
}

#[test]
fn compaction_scenario_survives_reopen() {
    let mut store = TestStore::new();
    store.put(k(1), b"abc").unwrap();
    store.put(k(2), b"xyz").unwrap();
    store.put(k(1), b"abcde").unwrap();
    store.reopen();

    assert_eq!(store.offset_of(k(2)).unwrap(), Some(25));
    assert_eq!(store.get(k(1)).unwrap().as_deref(), Some(&b"abcde"[..]));

    let bytes = store.file_bytes();
    assert_eq!(bytes.len(), 48);
    assert_eq!(&bytes[..16], k(1).as_bytes());
    assert_eq!(&bytes[16..20], &5u32.to_be_bytes());
    assert_eq!(&bytes[20..25], b"abcde");
    assert_eq!(&bytes[25..41], k(2).as_bytes());
}

#[test]
fn oversized_payload_is_rejected_without_change() {
    let store = TestStore::new();
    store.put(k(1), b"keep me").unwrap();
    let before = store.file_bytes();

    let err = store.put(k(1), &vec![0u8; MAX_PAYLOAD_SIZE + 1]).unwrap_err();
    assert!(err.is_size_violation());
    assert!(matches!(err, CoreError::PayloadTooLarge { .. }));

    assert_eq!(store.get(k(1)).unwrap().as_deref(), Some(&b"keep me"[..]));
    assert_eq!(store.file_bytes(), before);
}

#[test]
fn small_shift_buffer_moves_large_tails() {
    let store = TestStore::with_config(StoreConfig::default().shift_buffer_size(7));
    let mut model = ModelStore::new();

    for n in 0..6u8 {
        let payload = vec![n; 100 + usize::from(n) * 13];
        model.apply(&store, &StoreOp::Put { key: k(n), payload });
    }
    model.apply(&store, &StoreOp::Put { key: k(0), payload: vec![0xee; 1000] });
    model.apply(&store, &StoreOp::Put { key: k(2), payload: Vec::new() });
    model.apply(&store, &StoreOp::Remove { key: k(1) });

    model.verify(&store);
}

#[test]
fn second_open_of_same_file_is_locked_out() {
    let store = TestStore::new();
    let err = RecordStore::open(store.path()).unwrap_err();
    assert!(matches!(err, CoreError::StoreLocked));
}

#[test]
fn closed_store_rejects_operations() {
    let store = TestStore::new();
    store.close().unwrap();
    store.close().unwrap();

    assert!(!store.is_open());
    assert!(matches!(store.get(k(1)), Err(CoreError::StoreClosed)));
    assert!(matches!(store.put(k(1), b"x"), Err(CoreError::StoreClosed)));
}

#[test]
fn concurrent_writers_keep_file_packed() {
    const THREADS: u8 = 8;
    const KEYS_PER_THREAD: u8 = 4;
    const OPS_PER_THREAD: usize = 200;

    let mut fixture = TestStore::with_config(StoreConfig::default().shift_buffer_size(5));
    let store = Arc::new(fixture.take());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut model = ModelStore::new();
                for n in 0..OPS_PER_THREAD {
                    let key = pool_id(t * KEYS_PER_THREAD + (n % 4) as u8);
                    let op = if n % 5 == 4 {
                        StoreOp::Remove { key }
                    } else {
                        let len = (usize::from(t) * 7 + n * 13) % 97;
                        StoreOp::Put { key, payload: vec![t; len] }
                    };
                    model.apply(&store, &op);
                }
                model
            })
        })
        .collect();

    let mut expected = ModelStore::new();
    for handle in handles {
        expected.absorb(handle.join().unwrap());
    }

    expected.verify(&store);
    assert!(expected.len() <= usize::from(THREADS * KEYS_PER_THREAD));

    Arc::try_unwrap(store).unwrap().close().unwrap();
    fixture.reopen();
    expected.verify(&fixture);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_ops_match_model(ops in store_ops_strategy(40)) {
        let mut store = TestStore::new();
        let mut model = ModelStore::new();

        for op in &ops {
            if let StoreOp::Reopen = op {
                store.reopen();
            } else {
                model.apply(&store, op);
            }
        }

        model.verify(&store);
        store.reopen();
        model.verify(&store);
    }

    #[test]
    fn put_then_get_returns_payload(key in entity_id_strategy(), payload in payload_strategy()) {
        let store = TestStore::new();
        store.put(key, &payload).unwrap();
        prop_assert_eq!(store.get(key).unwrap(), Some(payload));
    }
}
