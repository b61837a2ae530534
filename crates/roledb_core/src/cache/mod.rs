//! Entity cache.
//!
//! Active entities live in memory as decoded, mutable values and are only
//! written back when they leave. Inactive entities are loaded, mutated and
//! saved in one call.

mod codec;
mod entry;
mod manager;

#[cfg(feature = "cbor")]
pub use codec::{CachedEntity, CborCodec};
pub use codec::EntryCodec;
pub use entry::{CacheEntry, Peeked};
pub use manager::EntityCache;
