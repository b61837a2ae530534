//! CLI command implementations.

pub mod inspect;
pub mod list;
pub mod record;
pub mod verify;

use roledb_core::{RecordStore, StoreConfig};
use std::path::Path;

/// Opens the record file, optionally creating it.
pub(crate) fn open_store(
    path: &Path,
    create: bool,
) -> Result<RecordStore, Box<dyn std::error::Error>> {
    let config = StoreConfig::new()
        .create_if_missing(create)
        .create_parent_dirs(create)
        .sync_on_write(true);

    RecordStore::open_with_config(path, config)
        .map_err(|e| format!("cannot open {}: {e}", path.display()).into())
}

/// Formats a byte count with a binary unit.
pub(crate) fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;

    if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
