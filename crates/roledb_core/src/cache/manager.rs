//! Active/inactive entity cache over a record store.

use crate::cache::codec::EntryCodec;
use crate::cache::entry::{CacheEntry, Peeked};
use crate::entity::EntityId;
use crate::error::CoreResult;
use crate::record::RecordStore;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, warn};

type RebuildHook<V> = Box<dyn Fn(EntityId, &V)>;

/// Keeps active entities decoded in memory on top of a [`RecordStore`].
///
/// - [`activate`](Self::activate) loads (or creates) an entity's value and
///   keeps it resident. Activating an already active entity reconciles the
///   live value against the new baseline instead of reading storage.
/// - [`deactivate`](Self::deactivate) writes the value back only if it is
///   dirty, then evicts it.
/// - [`mutate`](Self::mutate) and [`peek`](Self::peek) work on the live value
///   when the entity is active, and on a transient copy otherwise.
///
/// The cache owns the store for its whole life and closes it in
/// [`shutdown`](Self::shutdown). It does no locking of its own: drive it
/// from one thread, or wrap it in a lock.
pub struct EntityCache<C: EntryCodec> {
    store: RecordStore,
    codec: C,
    active: HashMap<EntityId, CacheEntry<C::Value>>,
    rebuild_hooks: Vec<RebuildHook<C::Value>>,
}

impl<C: EntryCodec> EntityCache<C> {
    /// Creates an empty cache over `store`.
    pub fn new(store: RecordStore, codec: C) -> Self {
        Self {
            store,
            codec,
            active: HashMap::new(),
            rebuild_hooks: Vec::new(),
        }
    }

    /// Registers a hook run every time a live value is reconciled.
    ///
    /// Hooks fire on re-activation and on [`reconcile_all`](Self::reconcile_all),
    /// after the value has been updated.
    pub fn on_rebuild(&mut self, hook: impl Fn(EntityId, &C::Value) + 'static) {
        self.rebuild_hooks.push(Box::new(hook));
    }

    /// Makes `key` active and returns its live entry.
    ///
    /// A key that is not yet active is loaded from the store, or built from
    /// `baseline` if it has no record, and starts clean. A key that is
    /// already active is reconciled against `baseline` in place, marked
    /// dirty, and reported to the rebuild hooks; storage is not read.
    ///
    /// # Errors
    ///
    /// Fails if the record cannot be read or decoded. The key is not
    /// activated in that case.
    pub fn activate(
        &mut self,
        key: EntityId,
        baseline: &C::Baseline,
    ) -> CoreResult<&mut CacheEntry<C::Value>> {
        match self.active.entry(key) {
            Entry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                self.codec
                    .reconcile(key, entry.value_mut_untracked(), baseline);
                entry.mark_dirty();
                for hook in &self.rebuild_hooks {
                    hook(key, entry.value());
                }
                debug!(key = %key, "reconciled active entity");
                Ok(entry)
            }
            Entry::Vacant(vacant) => {
                let entry = load(&self.store, &self.codec, key, baseline)?;
                debug!(key = %key, "activated entity");
                Ok(vacant.insert(entry))
            }
        }
    }

    /// Makes `key` inactive, writing its value back first if it is dirty.
    ///
    /// Returns whether a write happened. Does nothing for inactive keys.
    ///
    /// # Errors
    ///
    /// Fails if encoding or writing fails; the entry then stays active and
    /// dirty so nothing is lost.
    pub fn deactivate(&mut self, key: EntityId) -> CoreResult<bool> {
        let Some(entry) = self.active.get_mut(&key) else {
            return Ok(false);
        };

        let written = entry.is_dirty();
        if written {
            persist(&self.store, &self.codec, key, entry)?;
        }

        self.active.remove(&key);
        debug!(key = %key, written, "deactivated entity");
        Ok(written)
    }

    /// Runs `f` on the entry for `key` and returns its result.
    ///
    /// For an active key, `f` sees the live entry and nothing is written
    /// until the key is deactivated. For an inactive key, a transient entry
    /// is loaded as [`activate`](Self::activate) would, `f` runs on it, and
    /// the entry is written back if `f` left it dirty. The transient entry
    /// is never registered as active.
    ///
    /// # Errors
    ///
    /// Fails if the transient entry cannot be loaded or written back. In the
    /// latter case `f` has already run.
    pub fn mutate<R>(
        &mut self,
        key: EntityId,
        baseline: &C::Baseline,
        f: impl FnOnce(&mut CacheEntry<C::Value>) -> R,
    ) -> CoreResult<R> {
        if let Some(entry) = self.active.get_mut(&key) {
            return Ok(f(entry));
        }

        let mut entry = load(&self.store, &self.codec, key, baseline)?;
        let result = f(&mut entry);
        if entry.is_dirty() {
            persist(&self.store, &self.codec, key, &mut entry)?;
            debug!(key = %key, "saved inactive entity");
        }
        Ok(result)
    }

    /// Returns the value for `key` for inspection.
    ///
    /// Active keys return the live value. Inactive keys are loaded into a
    /// transient value that is never written back or registered.
    ///
    /// # Errors
    ///
    /// Fails if the transient value cannot be loaded.
    pub fn peek(
        &self,
        key: EntityId,
        baseline: &C::Baseline,
    ) -> CoreResult<Peeked<'_, C::Value>> {
        if let Some(entry) = self.active.get(&key) {
            return Ok(Peeked::Active(entry.value()));
        }

        let entry = load(&self.store, &self.codec, key, baseline)?;
        Ok(Peeked::Transient(entry.into_value()))
    }

    /// Reconciles every active entry against a new baseline.
    ///
    /// Storage is neither read nor written. Each entry is marked dirty and
    /// reported to the rebuild hooks. Returns the number of entries touched.
    pub fn reconcile_all(&mut self, baseline: &C::Baseline) -> usize {
        for (&key, entry) in &mut self.active {
            self.codec
                .reconcile(key, entry.value_mut_untracked(), baseline);
            entry.mark_dirty();
            for hook in &self.rebuild_hooks {
                hook(key, entry.value());
            }
        }

        debug!(entities = self.active.len(), "reconciled all active entities");
        self.active.len()
    }

    /// Deactivates every active key, then closes the store.
    ///
    /// Every key is attempted and the store is closed even if a write
    /// fails; the first error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first flush or close failure.
    pub fn shutdown(mut self) -> CoreResult<()> {
        let mut first_error = None;

        let keys: Vec<EntityId> = self.active.keys().copied().collect();
        for key in keys {
            if let Err(e) = self.deactivate(key) {
                warn!(key = %key, error = %e, "failed to save entity on shutdown");
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = self.store.close() {
            warn!(error = %e, "failed to close record store");
            first_error.get_or_insert(e);
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Returns whether `key` is active.
    #[must_use]
    pub fn is_active(&self, key: EntityId) -> bool {
        self.active.contains_key(&key)
    }

    /// Returns the live value of an active key, without loading anything.
    #[must_use]
    pub fn active(&self, key: EntityId) -> Option<&C::Value> {
        self.active.get(&key).map(CacheEntry::value)
    }

    /// Returns the number of active keys.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Returns the active keys, in no particular order.
    pub fn active_keys(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.keys().copied()
    }

    /// Returns the underlying store for administrative access.
    ///
    /// Writing a key through the store while it is active is overwritten
    /// when the key is deactivated dirty.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Returns the codec.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<C: EntryCodec> std::fmt::Debug for EntityCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("store", &self.store)
            .field("active", &self.active.len())
            .field("rebuild_hooks", &self.rebuild_hooks.len())
            .finish()
    }
}

fn load<C: EntryCodec>(
    store: &RecordStore,
    codec: &C,
    key: EntityId,
    baseline: &C::Baseline,
) -> CoreResult<CacheEntry<C::Value>> {
    let value = match store.get(key)? {
        Some(bytes) => codec.decode(key, &bytes, baseline)?,
        None => codec.fresh(key, baseline),
    };
    Ok(CacheEntry::clean(value))
}

fn persist<C: EntryCodec>(
    store: &RecordStore,
    codec: &C,
    key: EntityId,
    entry: &mut CacheEntry<C::Value>,
) -> CoreResult<()> {
    let bytes = codec.encode(entry.value())?;
    store.put(key, &bytes)?;
    entry.mark_clean();
    Ok(())
}
