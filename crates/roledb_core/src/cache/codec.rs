//! Codec capability used by the entity cache.

use crate::entity::EntityId;
use crate::error::CoreResult;

/// Converts between stored payload bytes and live cached values.
///
/// The cache never interprets payloads itself. The `Baseline` is whatever
/// shared configuration a value is built from (for role sets, the role
/// configuration) and is opaque to the cache.
pub trait EntryCodec {
    /// Decoded, mutable value held for each entity.
    type Value;
    /// Shared configuration values are built and reconciled against.
    type Baseline: ?Sized;

    /// Builds the value for an entity that has no stored record.
    fn fresh(&self, key: EntityId, baseline: &Self::Baseline) -> Self::Value;

    /// Decodes a stored payload.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the payload cannot be decoded.
    fn decode(
        &self,
        key: EntityId,
        bytes: &[u8],
        baseline: &Self::Baseline,
    ) -> CoreResult<Self::Value>;

    /// Encodes a value for storage.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the value cannot be encoded.
    fn encode(&self, value: &Self::Value) -> CoreResult<Vec<u8>>;

    /// Brings a live value in line with a new baseline.
    fn reconcile(&self, key: EntityId, value: &mut Self::Value, baseline: &Self::Baseline);
}

#[cfg(feature = "cbor")]
pub use cbor::{CachedEntity, CborCodec};

#[cfg(feature = "cbor")]
mod cbor {
    use super::EntryCodec;
    use crate::entity::EntityId;
    use crate::error::{CoreError, CoreResult};
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use std::marker::PhantomData;

    /// A value type that knows how to build and reconcile itself.
    pub trait CachedEntity: Sized {
        /// Shared configuration the value depends on.
        type Baseline: ?Sized;

        /// Builds the value for an entity with no stored record.
        fn fresh(key: EntityId, baseline: &Self::Baseline) -> Self;

        /// Applies a (possibly new) baseline to an existing value.
        fn reconcile(&mut self, baseline: &Self::Baseline);
    }

    /// [`EntryCodec`] that stores any serde value as CBOR.
    ///
    /// Decoded values are reconciled against the baseline right away, so a
    /// stored value always comes back consistent with current configuration.
    pub struct CborCodec<T> {
        _marker: PhantomData<fn() -> T>,
    }

    impl<T> CborCodec<T> {
        /// Creates a codec.
        #[must_use]
        pub fn new() -> Self {
            Self {
                _marker: PhantomData,
            }
        }
    }

    impl<T> Default for CborCodec<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T> std::fmt::Debug for CborCodec<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("CborCodec")
        }
    }

    impl<T> EntryCodec for CborCodec<T>
    where
        T: CachedEntity + Serialize + DeserializeOwned,
    {
        type Value = T;
        type Baseline = T::Baseline;

        fn fresh(&self, key: EntityId, baseline: &T::Baseline) -> T {
            T::fresh(key, baseline)
        }

        fn decode(&self, key: EntityId, bytes: &[u8], baseline: &T::Baseline) -> CoreResult<T> {
            let mut value: T = ciborium::from_reader(bytes)
                .map_err(|e| CoreError::codec(format!("decoding {key}: {e}")))?;
            value.reconcile(baseline);
            Ok(value)
        }

        fn encode(&self, value: &T) -> CoreResult<Vec<u8>> {
            let mut buf = Vec::new();
            ciborium::into_writer(value, &mut buf).map_err(|e| CoreError::codec(e.to_string()))?;
            Ok(buf)
        }

        fn reconcile(&self, _key: EntityId, value: &mut T, baseline: &T::Baseline) {
            value.reconcile(baseline);
        }
    }

}
