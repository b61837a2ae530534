//! Record header encoding.

use crate::entity::EntityId;
use crate::error::{CoreError, CoreResult};

/// Size of the key field.
pub const KEY_SIZE: usize = 16;
/// Size of the length field.
pub const LENGTH_SIZE: usize = 4;
/// Size of a full record header.
pub const HEADER_SIZE: usize = KEY_SIZE + LENGTH_SIZE;
/// Largest payload a record may carry.
pub const MAX_PAYLOAD_SIZE: usize = 4 * 1024 * 1024;

/// Decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Record key.
    pub key: EntityId,
    /// Declared payload length, as stored.
    pub length: u32,
}

impl RecordHeader {
    /// Creates a header for a payload of `length` bytes.
    #[must_use]
    pub const fn new(key: EntityId, length: u32) -> Self {
        Self { key, length }
    }

    /// Writes the header into a scratch buffer.
    pub fn encode_into(&self, buf: &mut [u8; HEADER_SIZE]) {
        buf[..KEY_SIZE].copy_from_slice(self.key.as_bytes());
        buf[KEY_SIZE..].copy_from_slice(&self.length.to_be_bytes());
    }

    /// Reads a header out of a scratch buffer.
    #[must_use]
    pub fn decode(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&buf[..KEY_SIZE]);
        Self {
            key: EntityId::from_bytes(key),
            length: decode_length(buf),
        }
    }

    /// Checks the declared length against `limit`.
    ///
    /// Lengths with the top bit set are reported as negative, since they
    /// are negative when read as a signed 32-bit integer.
    pub fn validate(&self, offset: u64, limit: usize) -> CoreResult<usize> {
        validate_length(self.length, offset, limit)
    }

    /// Total on-disk size of the record this header starts.
    #[must_use]
    pub fn record_size(&self) -> u64 {
        HEADER_SIZE as u64 + u64::from(self.length)
    }
}

/// Position and size of a live record, as seen by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordInfo {
    /// Record key.
    pub key: EntityId,
    /// Offset of the record header.
    pub offset: u64,
    /// Payload length.
    pub length: u32,
}

impl RecordInfo {
    /// Offset one past the last payload byte.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.offset + HEADER_SIZE as u64 + u64::from(self.length)
    }
}

pub(crate) fn encode_length(length: u32, buf: &mut [u8; HEADER_SIZE]) {
    buf[KEY_SIZE..].copy_from_slice(&length.to_be_bytes());
}

pub(crate) fn decode_length(buf: &[u8; HEADER_SIZE]) -> u32 {
    u32::from_be_bytes([buf[16], buf[17], buf[18], buf[19]])
}

pub(crate) fn validate_length(length: u32, offset: u64, limit: usize) -> CoreResult<usize> {
    if (length as i32) < 0 {
        return Err(CoreError::corrupt_record(
            offset,
            format!("size is negative ({} < 0)", length as i32),
        ));
    }
    let length = length as usize;
    if length > limit {
        return Err(CoreError::corrupt_record(
            offset,
            format!("size greater than maximum ({length} > {limit})"),
        ));
    }
    Ok(length)
}
