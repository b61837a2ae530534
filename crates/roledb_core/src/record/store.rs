//! Record store: the file, its pointer index, and every operation on them.

use crate::config::StoreConfig;
use crate::entity::EntityId;
use crate::error::{CoreError, CoreResult};
use crate::record::header::{
    decode_length, encode_length, validate_length, RecordHeader, RecordInfo, HEADER_SIZE,
    KEY_SIZE,
};
use crate::record::shift::shift_tail;
use crate::stats::{StatsSnapshot, StoreStats};
use parking_lot::Mutex;
use roledb_storage::{FileBackend, StorageBackend};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A single-file key-value store keyed by [`EntityId`].
///
/// The store keeps an in-memory pointer index from key to the offset of
/// that key's record header. The index is rebuilt by a linear scan on open
/// and kept exact by every mutation afterwards: when a payload changes
/// length or a record is removed, all following records are shifted and
/// every pointer at or past the shift point is adjusted by the same delta.
///
/// # Locking
///
/// One mutex guards the backend, the index, and the scratch buffers used
/// for header encoding and shifting. No operation can observe a partially
/// applied shift. The scratch buffers make the store non-reentrant; all
/// access goes through the lock.
///
/// # Durability
///
/// There is no write-ahead log and no checksum. An I/O error in the middle
/// of a shift leaves the file and the index disagreeing, and the error is
/// returned as is. Reopening the file rebuilds the index from whatever is
/// on disk.
///
/// # Example
///
/// ```no_run
/// use roledb_core::{EntityId, RecordStore};
/// use std::path::Path;
///
/// let store = RecordStore::open(Path::new("player_roles"))?;
/// let key = EntityId::random();
/// store.put(key, b"admin")?;
/// assert_eq!(store.get(key)?, Some(b"admin".to_vec()));
/// store.close()?;
/// # Ok::<(), roledb_core::CoreError>(())
/// ```
pub struct RecordStore {
    path: Option<PathBuf>,
    config: StoreConfig,
    inner: Mutex<Option<StoreInner>>,
    stats: StoreStats,
}

struct StoreInner {
    backend: Box<dyn StorageBackend>,
    index: HashMap<EntityId, u64>,
    header: [u8; HEADER_SIZE],
    shift_buf: Vec<u8>,
}

impl RecordStore {
    /// Opens or creates the record file at `path` with default configuration.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or read, if another handle holds
    /// it, or if any record in it is malformed.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Opens the record file at `path` with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `Storage(Io(NotFound))` if the file is missing and
    ///   `create_if_missing` is false
    /// - `StoreLocked` if `lock_file` is set and another handle has the file
    /// - `CorruptRecord` if the index scan finds a bad length or a
    ///   truncated record
    pub fn open_with_config(path: &Path, config: StoreConfig) -> CoreResult<Self> {
        if config.create_parent_dirs {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let backend =
            FileBackend::open_with_options(path, config.create_if_missing, config.lock_file)
                .map_err(CoreError::from_open)?;

        Self::from_backend(Box::new(backend), config, Some(path.to_path_buf()))
    }

    /// Opens a store over an arbitrary backend.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot be read or holds a malformed record.
    pub fn open_with_backend(
        backend: Box<dyn StorageBackend>,
        config: StoreConfig,
    ) -> CoreResult<Self> {
        Self::from_backend(backend, config, None)
    }

    fn from_backend(
        backend: Box<dyn StorageBackend>,
        config: StoreConfig,
        path: Option<PathBuf>,
    ) -> CoreResult<Self> {
        let mut header = [0u8; HEADER_SIZE];
        let index = build_index(backend.as_ref(), config.payload_limit(), &mut header)?;

        info!(
            path = ?path,
            records = index.len(),
            size = backend.size()?,
            "opened record store"
        );

        let shift_buf = vec![0u8; config.shift_buffer_len()];
        Ok(Self {
            path,
            config,
            inner: Mutex::new(Some(StoreInner {
                backend,
                index,
                header,
                shift_buf,
            })),
            stats: StoreStats::new(),
        })
    }

    /// Returns the payload stored for `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed or the read fails.
    pub fn get(&self, key: EntityId) -> CoreResult<Option<Vec<u8>>> {
        self.stats.record_lookup();
        self.with_inner(|inner| {
            let Some(&offset) = inner.index.get(&key) else {
                return Ok(None);
            };

            let length = inner.read_length(offset)?;
            let payload = inner
                .backend
                .read_at(offset + HEADER_SIZE as u64, length as usize)?;

            self.stats.record_read(u64::from(length));
            Ok(Some(payload))
        })
    }

    /// Stores `payload` under `key`, replacing any previous payload.
    ///
    /// A new key is appended at the end of the file. An existing key with
    /// an unchanged length is overwritten in place. Otherwise the records
    /// after it are shifted by the length difference before the new payload
    /// is written at the record's existing offset.
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` without touching anything if the payload
    /// exceeds the configured maximum. I/O failures during a shift leave
    /// the store inconsistent.
    pub fn put(&self, key: EntityId, payload: &[u8]) -> CoreResult<()> {
        let limit = self.config.payload_limit();
        if payload.len() > limit {
            return Err(CoreError::PayloadTooLarge {
                len: payload.len(),
                max: limit,
            });
        }
        let new_len = payload.len() as u32;
        let written = (HEADER_SIZE + payload.len()) as u64;

        self.with_inner(|inner| {
            match inner.index.get(&key).copied() {
                None => {
                    let offset = inner.backend.size()?;
                    RecordHeader::new(key, new_len).encode_into(&mut inner.header);
                    inner.backend.write_at(offset, &inner.header)?;
                    inner
                        .backend
                        .write_at(offset + HEADER_SIZE as u64, payload)?;
                    inner.index.insert(key, offset);

                    debug!(key = %key, offset, len = new_len, "appended record");
                    self.stats.record_append(written);
                }
                Some(offset) => {
                    let old_len = inner.read_length(offset)?;
                    let old_len = validate_length(old_len, offset, limit)? as u32;

                    if old_len == new_len {
                        inner
                            .backend
                            .write_at(offset + HEADER_SIZE as u64, payload)?;
                        self.stats.record_in_place_update(u64::from(new_len));
                    } else {
                        let old_end = offset + HEADER_SIZE as u64 + u64::from(old_len);
                        let delta = i64::from(new_len) - i64::from(old_len);
                        let moved = inner.shift_after(old_end, delta)?;
                        self.stats.record_shift(moved);

                        encode_length(new_len, &mut inner.header);
                        inner
                            .backend
                            .write_at(offset + KEY_SIZE as u64, &inner.header[KEY_SIZE..])?;
                        inner
                            .backend
                            .write_at(offset + HEADER_SIZE as u64, payload)?;

                        debug!(key = %key, offset, delta, moved, "resized record");
                        self.stats.record_shifted_update(written);
                    }
                }
            }

            if self.config.sync_on_write {
                inner.backend.sync()?;
            }
            Ok(())
        })
    }

    /// Removes the record for `key`.
    ///
    /// Returns `false` without touching anything if there is no record.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed or an I/O error occurs while shifting.
    pub fn remove(&self, key: EntityId) -> CoreResult<bool> {
        let limit = self.config.payload_limit();
        self.with_inner(|inner| {
            let Some(offset) = inner.index.remove(&key) else {
                return Ok(false);
            };

            let length = validate_length(inner.read_length(offset)?, offset, limit)?;
            let record_size = (HEADER_SIZE + length) as u64;
            let moved = inner.shift_after(offset + record_size, -(record_size as i64))?;

            if self.config.sync_on_write {
                inner.backend.sync()?;
            }

            debug!(key = %key, offset, len = length, moved, "removed record");
            self.stats.record_shift(moved);
            self.stats.record_remove();
            Ok(true)
        })
    }

    /// Returns whether a record exists for `key`.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed.
    pub fn contains(&self, key: EntityId) -> CoreResult<bool> {
        self.with_inner(|inner| Ok(inner.index.contains_key(&key)))
    }

    /// Returns the number of records.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed.
    pub fn len(&self) -> CoreResult<usize> {
        self.with_inner(|inner| Ok(inner.index.len()))
    }

    /// Returns whether the store holds no records.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed.
    pub fn is_empty(&self) -> CoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Returns a snapshot of all keys, in no particular order.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed.
    pub fn keys(&self) -> CoreResult<Vec<EntityId>> {
        self.with_inner(|inner| Ok(inner.index.keys().copied().collect()))
    }

    /// Returns the current header offset of `key`'s record.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed.
    pub fn offset_of(&self, key: EntityId) -> CoreResult<Option<u64>> {
        self.with_inner(|inner| Ok(inner.index.get(&key).copied()))
    }

    /// Returns the size of the record file in bytes.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed.
    pub fn file_size(&self) -> CoreResult<u64> {
        self.with_inner(|inner| Ok(inner.backend.size()?))
    }

    /// Lists every record in file order.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed or a header cannot be read.
    pub fn scan(&self) -> CoreResult<Vec<RecordInfo>> {
        self.with_inner(|inner| {
            let mut pointers: Vec<(EntityId, u64)> =
                inner.index.iter().map(|(&k, &o)| (k, o)).collect();
            pointers.sort_unstable_by_key(|&(_, offset)| offset);

            pointers
                .into_iter()
                .map(|(key, offset)| {
                    Ok(RecordInfo {
                        key,
                        offset,
                        length: inner.read_length(offset)?,
                    })
                })
                .collect()
        })
    }

    /// Flushes pending writes to the OS.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed or the flush fails.
    pub fn flush(&self) -> CoreResult<()> {
        self.with_inner(|inner| Ok(inner.backend.flush()?))
    }

    /// Syncs the record file to durable storage.
    ///
    /// # Errors
    ///
    /// Fails if the store is closed or the sync fails.
    pub fn sync(&self) -> CoreResult<()> {
        self.with_inner(|inner| Ok(inner.backend.sync()?))
    }

    /// Releases the file handle.
    ///
    /// Closing an already closed store does nothing. Every other operation
    /// on a closed store returns `StoreClosed`.
    ///
    /// # Errors
    ///
    /// Fails if the final flush fails. The handle is released either way.
    pub fn close(&self) -> CoreResult<()> {
        let Some(mut inner) = self.inner.lock().take() else {
            return Ok(());
        };

        info!(path = ?self.path, records = inner.index.len(), "closing record store");
        inner.backend.flush()?;
        Ok(())
    }

    /// Returns whether the store is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Returns the path of the record file, if file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the configuration the store was opened with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns a snapshot of the operation counters.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut StoreInner) -> CoreResult<T>) -> CoreResult<T> {
        let mut guard = self.inner.lock();
        let inner = guard.as_mut().ok_or(CoreError::StoreClosed)?;
        f(inner)
    }
}

impl StoreInner {
    /// Reads the length field of the record whose header starts at `offset`.
    fn read_length(&mut self, offset: u64) -> CoreResult<u32> {
        self.backend
            .read_into(offset + KEY_SIZE as u64, &mut self.header[KEY_SIZE..])?;
        Ok(decode_length(&self.header))
    }

    /// Shifts everything from `source` to the end of the file by `delta`
    /// and moves every pointer at or past `source` along with it.
    fn shift_after(&mut self, source: u64, delta: i64) -> CoreResult<u64> {
        let moved = shift_tail(self.backend.as_mut(), source, delta, &mut self.shift_buf)?;

        for offset in self.index.values_mut() {
            if *offset >= source {
                *offset = offset.wrapping_add_signed(delta);
            }
        }

        Ok(moved)
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

/// Scans the whole backend and maps every key to its header offset.
///
/// A key seen twice keeps its last offset.
fn build_index(
    backend: &dyn StorageBackend,
    limit: usize,
    header: &mut [u8; HEADER_SIZE],
) -> CoreResult<HashMap<EntityId, u64>> {
    let size = backend.size()?;
    let mut index = HashMap::new();
    let mut offset = 0u64;

    while offset < size {
        if offset + HEADER_SIZE as u64 > size {
            return Err(CoreError::corrupt_record(
                offset,
                format!("truncated header ({} bytes remain)", size - offset),
            ));
        }

        backend.read_into(offset, header)?;
        let record = RecordHeader::decode(header);
        record.validate(offset, limit)?;

        let end = offset + record.record_size();
        if end > size {
            return Err(CoreError::corrupt_record(
                offset,
                format!("payload runs past end of file ({end} > {size})"),
            ));
        }

        index.insert(record.key, offset);
        offset = end;
    }

    debug!(records = index.len(), size, "rebuilt pointer index");
    Ok(index)
}
