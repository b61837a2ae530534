//! # roledb core
//!
//! Persistence for small per-entity records keyed by a 128-bit identifier.
//!
//! This crate provides:
//! - [`RecordStore`]: a single flat file of `key | length | payload` records
//!   with an in-memory pointer index, kept gap-free by shifting trailing
//!   records on every size change or removal
//! - [`EntityCache`]: active entities kept decoded and mutated in place,
//!   written back only if dirty when they leave; inactive entities loaded,
//!   mutated and saved per call
//! - [`EntryCodec`]: the seam through which callers plug in their value type
//!
//! ## Example
//!
//! ```rust
//! use roledb_core::{EntityId, RecordStore, StoreConfig};
//! use roledb_storage::InMemoryBackend;
//!
//! let store = RecordStore::open_with_backend(
//!     Box::new(InMemoryBackend::new()),
//!     StoreConfig::default(),
//! )?;
//!
//! let a = EntityId::from_u64_pair(0, 1);
//! let b = EntityId::from_u64_pair(0, 2);
//! store.put(a, b"abc")?;
//! store.put(b, b"xyz")?;
//! store.put(a, b"abcde")?;
//!
//! assert_eq!(store.offset_of(b)?, Some(25));
//! assert_eq!(store.get(b)?, Some(b"xyz".to_vec()));
//! # Ok::<(), roledb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod entity;
mod error;
mod record;
mod stats;

#[cfg(feature = "cbor")]
pub use cache::{CachedEntity, CborCodec};
pub use cache::{CacheEntry, EntityCache, EntryCodec, Peeked};
pub use config::StoreConfig;
pub use entity::EntityId;
pub use error::{CoreError, CoreResult};
pub use record::{
    RecordHeader, RecordInfo, RecordStore, HEADER_SIZE, KEY_SIZE, LENGTH_SIZE, MAX_PAYLOAD_SIZE,
};
pub use stats::{StatsSnapshot, StoreStats};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
