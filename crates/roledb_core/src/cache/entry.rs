//! Cached values and their dirty flag.

use std::ops::Deref;

/// A decoded value plus a flag recording whether it diverged from storage.
///
/// A dirty entry is written back before it is evicted; a clean one is
/// dropped silently. Mutable access through [`CacheEntry::value_mut`] marks
/// the entry dirty; [`CacheEntry::value_mut_untracked`] does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<V> {
    value: V,
    dirty: bool,
}

impl<V> CacheEntry<V> {
    /// Wraps a value that matches what is stored.
    #[must_use]
    pub fn clean(value: V) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    /// Returns the value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the value for mutation and marks the entry dirty.
    pub fn value_mut(&mut self) -> &mut V {
        self.dirty = true;
        &mut self.value
    }

    /// Returns the value for mutation without touching the dirty flag.
    ///
    /// Use for changes that must not be persisted, or call
    /// [`CacheEntry::mark_dirty`] afterwards.
    pub fn value_mut_untracked(&mut self) -> &mut V {
        &mut self.value
    }

    /// Marks the entry as diverged from storage.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the entry must be written back before eviction.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Consumes the entry, returning the value.
    pub fn into_value(self) -> V {
        self.value
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Result of [`EntityCache::peek`](super::EntityCache::peek).
///
/// Borrowed from the cache when the entity is active, otherwise a transient
/// copy loaded from storage that is never written back.
#[derive(Debug)]
pub enum Peeked<'a, V> {
    /// The live value of an active entity.
    Active(&'a V),
    /// A value loaded just for this call.
    Transient(V),
}

impl<V> Peeked<'_, V> {
    /// Returns whether the value belongs to an active entity.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

impl<V: Clone> Peeked<'_, V> {
    /// Returns an owned copy of the value.
    #[must_use]
    pub fn into_owned(self) -> V {
        match self {
            Self::Active(value) => value.clone(),
            Self::Transient(value) => value,
        }
    }
}

impl<V> Deref for Peeked<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        match self {
            Self::Active(value) => value,
            Self::Transient(value) => value,
        }
    }
}
