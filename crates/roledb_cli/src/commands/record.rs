//! Direct record access: get, put, remove.

use super::open_store;
use roledb_core::EntityId;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Prints the payload stored for `key`.
pub fn get(path: &Path, key: EntityId, hex: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let payload = store.get(key)?;
    store.close()?;

    match payload {
        Some(bytes) if hex => println!("{}", to_hex(&bytes)),
        Some(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
        None => return Err(format!("no record for {key}").into()),
    }

    Ok(())
}

/// Stores `payload` under `key`.
pub fn put(path: &Path, key: EntityId, payload: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, true)?;
    let existed = store.contains(key)?;
    store.put(key, payload)?;
    store.close()?;

    info!(key = %key, len = payload.len(), existed, "stored record");
    println!(
        "{} {key} ({} bytes)",
        if existed { "Updated" } else { "Created" },
        payload.len()
    );
    Ok(())
}

/// Removes the record for `key`.
pub fn remove(path: &Path, key: EntityId) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let removed = store.remove(key)?;
    store.close()?;

    if removed {
        info!(key = %key, "removed record");
        println!("Removed {key}");
    } else {
        println!("No record for {key}");
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledb_core::RecordStore;

    #[test]
    fn hex_formatting() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x10]), "00ab10");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn put_then_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles");
        let key = EntityId::from_bytes([3; 16]);

        put(&path, key, b"admin").unwrap();
        {
            let store = RecordStore::open(&path).unwrap();
            assert_eq!(store.get(key).unwrap(), Some(b"admin".to_vec()));
        }

        remove(&path, key).unwrap();
        let store = RecordStore::open(&path).unwrap();
        assert!(store.is_empty().unwrap());
    }
}
