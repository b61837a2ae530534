//! Test fixtures and store helpers.
//!
//! Provides file-backed stores in temporary directories, plus a small
//! role-set value type for exercising the entity cache.

use roledb_core::{CachedEntity, CborCodec, EntityCache, EntityId, RecordStore, StoreConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name used for fixture record files.
pub const RECORD_FILE: &str = "roles.dat";

/// A file-backed record store with automatic cleanup.
pub struct TestStore {
    store: Option<RecordStore>,
    config: StoreConfig,
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl TestStore {
    /// Creates an empty store in a fresh temporary directory.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with a custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(RECORD_FILE);
        let store =
            RecordStore::open_with_config(&path, config.clone()).expect("Failed to open store");

        Self {
            store: Some(store),
            config,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Closes the store and opens it again from the same file.
    pub fn reopen(&mut self) {
        if let Some(store) = self.store.take() {
            store.close().expect("Failed to close store");
        }
        self.store = Some(
            RecordStore::open_with_config(&self.path, self.config.clone())
                .expect("Failed to reopen store"),
        );
    }

    /// Hands the open store out, leaving the file in place.
    ///
    /// The fixture must not be used as a store afterwards; call
    /// [`reopen`](Self::reopen) first.
    pub fn take(&mut self) -> RecordStore {
        self.store.take().expect("Store already taken")
    }

    /// Returns the record file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the raw bytes of the record file.
    pub fn file_bytes(&self) -> Vec<u8> {
        if let Some(store) = &self.store {
            store.flush().expect("Failed to flush store");
        }
        std::fs::read(&self.path).expect("Failed to read record file")
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = RecordStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref().expect("Store was taken")
    }
}

/// Role assignments for one entity, as a cache value.
///
/// Stored roles are persisted; roles from the baseline are granted to every
/// entity and rebuilt on each reconcile, so they are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    /// Roles granted to this entity specifically.
    pub granted: BTreeSet<String>,
    /// Roles every entity receives from the baseline.
    #[serde(skip)]
    pub defaults: BTreeSet<String>,
    /// Number of times this value has been reconciled.
    #[serde(skip)]
    pub reconciled: u32,
}

impl RoleSet {
    /// Returns whether the entity holds `role`, granted or by default.
    pub fn has(&self, role: &str) -> bool {
        self.granted.contains(role) || self.defaults.contains(role)
    }
}

impl CachedEntity for RoleSet {
    type Baseline = [&'static str];

    fn fresh(_key: EntityId, baseline: &Self::Baseline) -> Self {
        Self {
            granted: BTreeSet::new(),
            defaults: baseline.iter().map(|r| (*r).to_string()).collect(),
            reconciled: 0,
        }
    }

    fn reconcile(&mut self, baseline: &Self::Baseline) {
        self.defaults = baseline.iter().map(|r| (*r).to_string()).collect();
        self.reconciled += 1;
    }
}

/// Entity cache of [`RoleSet`] values over a temporary store.
pub type RoleCache = EntityCache<CborCodec<RoleSet>>;

/// Builds a [`RoleCache`] over the store held by `fixture`.
///
/// The fixture's store is taken; reopen the fixture after the cache has
/// been shut down to inspect the file.
pub fn role_cache(fixture: &mut TestStore) -> RoleCache {
    EntityCache::new(fixture.take(), CborCodec::new())
}
