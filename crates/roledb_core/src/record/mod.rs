//! The record store.
//!
//! A single flat file of back-to-back records, each a 20-byte header
//! (16-byte key, 4-byte big-endian length) followed by the payload:
//!
//! ```text
//! file   := record*
//! record := key(16, big-endian) ++ length(4, big-endian, <= 4 MiB) ++ payload(length)
//! ```
//!
//! There is no file header, version tag, padding, or checksum. The file size
//! is always the sum of `20 + length` over all live records. Record order
//! carries no meaning and changes whenever a size change or removal shifts
//! the trailing records.

mod header;
mod shift;
mod store;

pub use header::{RecordHeader, RecordInfo, HEADER_SIZE, KEY_SIZE, LENGTH_SIZE, MAX_PAYLOAD_SIZE};
pub use store::RecordStore;
