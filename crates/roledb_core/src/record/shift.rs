//! Trailing-range shifts.
//!
//! A size change or removal moves every byte after the affected record by
//! the same signed delta, keeping the file gap-free. Copies go through a
//! bounded buffer and run in the direction that never reads a byte after
//! it has been overwritten: top-down when growing, bottom-up when shrinking.

use roledb_storage::{StorageBackend, StorageError, StorageResult};

/// Moves `[source, size)` so that it starts at `source + delta`.
///
/// Growing extends the backend by `delta` bytes before copying; shrinking
/// copies first and truncates afterwards. Returns the number of bytes moved.
///
/// The caller must ensure `source + delta >= 0`. A `source` past the end of
/// the backend, as left behind by an earlier failed shift, is reported as
/// `ReadPastEnd` without touching anything. A failure part-way leaves the
/// range partially moved.
pub(crate) fn shift_tail(
    backend: &mut dyn StorageBackend,
    source: u64,
    delta: i64,
    buf: &mut [u8],
) -> StorageResult<u64> {
    let size = backend.size()?;
    let length = size.checked_sub(source).ok_or(StorageError::ReadPastEnd {
        offset: source,
        len: 0,
        size,
    })?;

    if delta > 0 {
        backend.extend(delta.unsigned_abs())?;
        move_down_from_top(backend, source, length, delta.unsigned_abs(), buf)?;
    } else if delta < 0 {
        let distance = delta.unsigned_abs();
        move_up_from_bottom(backend, source, length, distance, buf)?;
        backend.truncate(size - distance)?;
    }

    Ok(length)
}

/// Copies `[source, source + length)` to `source + distance`, highest chunk first.
fn move_down_from_top(
    backend: &mut dyn StorageBackend,
    source: u64,
    length: u64,
    distance: u64,
    buf: &mut [u8],
) -> StorageResult<()> {
    let mut back = source + length;
    let mut remaining = length;

    while remaining > 0 {
        let chunk = chunk_len(remaining, buf.len());
        let front = back - chunk as u64;

        backend.read_into(front, &mut buf[..chunk])?;
        backend.write_at(front + distance, &buf[..chunk])?;

        back = front;
        remaining -= chunk as u64;
    }

    Ok(())
}

/// Copies `[source, source + length)` to `source - distance`, lowest chunk first.
fn move_up_from_bottom(
    backend: &mut dyn StorageBackend,
    source: u64,
    length: u64,
    distance: u64,
    buf: &mut [u8],
) -> StorageResult<()> {
    let mut front = source;
    let mut remaining = length;

    while remaining > 0 {
        let chunk = chunk_len(remaining, buf.len());

        backend.read_into(front, &mut buf[..chunk])?;
        backend.write_at(front - distance, &buf[..chunk])?;

        front += chunk as u64;
        remaining -= chunk as u64;
    }

    Ok(())
}

fn chunk_len(remaining: u64, capacity: usize) -> usize {
    usize::try_from(remaining).map_or(capacity, |r| r.min(capacity))
}
