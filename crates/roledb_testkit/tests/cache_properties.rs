//! Entity cache behavior over a real record store.

use roledb_core::{EntityId, HEADER_SIZE};
use roledb_testkit::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

const BASELINE: &[&str] = &["default"];
const RELOADED: &[&str] = &["default", "member"];

fn k(n: u8) -> EntityId {
    pool_id(n)
}

#[test]
fn activate_twice_reads_storage_once() {
    let mut fixture = TestStore::new();
    let mut cache = role_cache(&mut fixture);

    cache.activate(k(1), BASELINE).unwrap();
    let lookups = cache.store().stats().lookups;

    let entry = cache.activate(k(1), RELOADED).unwrap();
    assert!(entry.is_dirty());
    assert!(entry.value().has("member"));
    assert_eq!(cache.store().stats().lookups, lookups);
    assert_eq!(cache.active_count(), 1);

    cache.shutdown().unwrap();
}

#[test]
fn fresh_activation_is_clean_and_not_written() {
    let mut fixture = TestStore::new();
    let mut cache = role_cache(&mut fixture);

    let entry = cache.activate(k(1), BASELINE).unwrap();
    assert!(!entry.is_dirty());
    assert!(entry.value().has("default"));

    assert!(!cache.deactivate(k(1)).unwrap());
    assert_eq!(cache.store().stats().writes(), 0);
    assert!(cache.store().is_empty().unwrap());
}

#[test]
fn active_mutation_is_deferred_until_deactivate() {
    let mut fixture = TestStore::new();
    let mut cache = role_cache(&mut fixture);
    cache.activate(k(1), BASELINE).unwrap();

    cache
        .mutate(k(1), BASELINE, |entry| {
            entry.value_mut().granted.insert("admin".into());
        })
        .unwrap();
    assert_eq!(cache.store().stats().writes(), 0);

    let peeked = cache.peek(k(1), BASELINE).unwrap();
    assert!(peeked.is_active());
    assert!(peeked.has("admin"));
    assert_eq!(cache.store().stats().writes(), 0);

    assert!(cache.deactivate(k(1)).unwrap());
    assert_eq!(cache.store().stats().writes(), 1);
    assert!(!cache.is_active(k(1)));

    cache.shutdown().unwrap();
    fixture.reopen();
    let stored = fixture.get(k(1)).unwrap().unwrap();
    assert!(!stored.is_empty());
    assert_eq!(fixture.file_size().unwrap(), (HEADER_SIZE + stored.len()) as u64);
}

#[test]
fn inactive_mutation_writes_once_and_leaves_no_entry() {
    let mut fixture = TestStore::new();
    let mut cache = role_cache(&mut fixture);

    let granted = cache
        .mutate(k(2), BASELINE, |entry| {
            entry.value_mut().granted.insert("vip".into());
            entry.value().granted.len()
        })
        .unwrap();

    assert_eq!(granted, 1);
    assert_eq!(cache.store().stats().writes(), 1);
    assert!(!cache.is_active(k(2)));
    assert_eq!(cache.active_count(), 0);

    let peeked = cache.peek(k(2), BASELINE).unwrap();
    assert!(!peeked.is_active());
    assert!(peeked.has("vip"));
    assert_eq!(cache.store().stats().writes(), 1);
}

#[test]
fn inactive_read_only_mutation_writes_nothing() {
    let mut fixture = TestStore::new();
    let mut cache = role_cache(&mut fixture);

    let has_admin = cache
        .mutate(k(3), BASELINE, |entry| entry.value().has("admin"))
        .unwrap();

    assert!(!has_admin);
    assert_eq!(cache.store().stats().writes(), 0);
    assert!(cache.store().is_empty().unwrap());
}

#[test]
fn reconcile_all_touches_only_memory() {
    let mut fixture = TestStore::new();
    let mut cache = role_cache(&mut fixture);
    cache.activate(k(1), BASELINE).unwrap();
    cache.activate(k(2), BASELINE).unwrap();

    let rebuilt = Rc::new(Cell::new(0));
    let counter = Rc::clone(&rebuilt);
    cache.on_rebuild(move |_, roles| {
        assert!(roles.has("member"));
        counter.set(counter.get() + 1);
    });

    let before = cache.store().stats();
    assert_eq!(cache.reconcile_all(RELOADED), 2);
    let after = cache.store().stats();

    assert_eq!(rebuilt.get(), 2);
    assert_eq!(before.lookups, after.lookups);
    assert_eq!(before.writes(), after.writes());

    cache.shutdown().unwrap();
    fixture.reopen();
    assert_eq!(fixture.len().unwrap(), 2);
}

#[test]
fn stored_roles_survive_a_restart() {
    let mut fixture = TestStore::new();
    {
        let mut cache = role_cache(&mut fixture);
        cache.activate(k(4), BASELINE).unwrap();
        cache
            .mutate(k(4), BASELINE, |entry| {
                entry.value_mut().granted.insert("builder".into());
            })
            .unwrap();
        cache.shutdown().unwrap();
    }

    fixture.reopen();
    let mut cache = role_cache(&mut fixture);
    let entry = cache.activate(k(4), RELOADED).unwrap();
    assert!(!entry.is_dirty());
    assert!(entry.value().has("builder"));
    assert!(entry.value().has("member"));
    cache.shutdown().unwrap();
}
