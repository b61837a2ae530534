//! Record store statistics.
//!
//! Counters are atomic and can be read while operations are in progress.
//! Values are monotonically increasing.
//!
//! ```rust,ignore
//! let stats = store.stats();
//! println!("shifted updates: {}", stats.shifted_updates);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a record store.
#[derive(Debug, Default)]
pub struct StoreStats {
    lookups: AtomicU64,
    reads: AtomicU64,
    appends: AtomicU64,
    in_place_updates: AtomicU64,
    shifted_updates: AtomicU64,
    removes: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    bytes_shifted: AtomicU64,
}

impl StoreStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self, bytes: u64) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_append(&self, bytes: u64) {
        self.appends.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_in_place_update(&self, bytes: u64) {
        self.in_place_updates.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_shifted_update(&self, bytes: u64) {
        self.shifted_updates.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_shift(&self, bytes: u64) {
        self.bytes_shifted.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            appends: self.appends.load(Ordering::Relaxed),
            in_place_updates: self.in_place_updates.load(Ordering::Relaxed),
            shifted_updates: self.shifted_updates.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_shifted: self.bytes_shifted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`StoreStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Number of `get` calls, hit or miss.
    pub lookups: u64,
    /// Number of `get` calls that found a record.
    pub reads: u64,
    /// Number of `put` calls that appended a new record.
    pub appends: u64,
    /// Number of `put` calls that overwrote a same-length payload.
    pub in_place_updates: u64,
    /// Number of `put` calls that changed a payload's length.
    pub shifted_updates: u64,
    /// Number of successful `remove` calls.
    pub removes: u64,
    /// Payload bytes returned by `get`.
    pub bytes_read: u64,
    /// Header and payload bytes written by `put`.
    pub bytes_written: u64,
    /// Trailing bytes moved by shifts.
    pub bytes_shifted: u64,
}

impl StatsSnapshot {
    /// Total number of `put` calls that reached the file.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.appends + self.in_place_updates + self.shifted_updates
    }
}
