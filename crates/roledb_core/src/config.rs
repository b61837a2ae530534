//! Record store configuration.

use crate::record::MAX_PAYLOAD_SIZE;

/// Configuration for opening a record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Whether to create the record file if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to create missing parent directories of the record file.
    pub create_parent_dirs: bool,

    /// Whether to take an exclusive lock on the record file.
    pub lock_file: bool,

    /// Whether to sync the file after every mutating operation.
    pub sync_on_write: bool,

    /// Size of the intermediate buffer used when shifting trailing records.
    pub shift_buffer_size: usize,

    /// Largest payload accepted by `put` and by the open-time scan.
    ///
    /// Values above [`MAX_PAYLOAD_SIZE`] are clamped to it.
    pub max_payload_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            create_parent_dirs: false,
            lock_file: true,
            sync_on_write: false,
            shift_buffer_size: 1024,
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the record file if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to create missing parent directories.
    #[must_use]
    pub const fn create_parent_dirs(mut self, value: bool) -> Self {
        self.create_parent_dirs = value;
        self
    }

    /// Sets whether to lock the record file exclusively.
    #[must_use]
    pub const fn lock_file(mut self, value: bool) -> Self {
        self.lock_file = value;
        self
    }

    /// Sets whether to sync after every mutating operation.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets the shift buffer size. Zero is treated as one.
    #[must_use]
    pub const fn shift_buffer_size(mut self, size: usize) -> Self {
        self.shift_buffer_size = size;
        self
    }

    /// Sets the maximum payload size.
    #[must_use]
    pub const fn max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Payload limit actually enforced.
    pub(crate) fn payload_limit(&self) -> usize {
        self.max_payload_size.min(MAX_PAYLOAD_SIZE)
    }

    /// Shift buffer size actually used.
    pub(crate) fn shift_buffer_len(&self) -> usize {
        self.shift_buffer_size.max(1)
    }
}
