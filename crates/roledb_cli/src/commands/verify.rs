//! Verify command implementation.
//!
//! Walks the file independently of the record store so that damage is
//! reported record by record instead of failing on the first bad header.

use roledb_core::{EntityId, RecordHeader, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use roledb_storage::{FileBackend, StorageBackend};
use std::collections::HashMap;
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of records checked.
    pub records_checked: usize,
    /// Number of valid records.
    pub valid_records: usize,
    /// Keys that appear more than once.
    pub duplicate_keys: usize,
    /// Bytes accounted for by well-formed records.
    pub covered_bytes: u64,
    /// File size at the time of the scan.
    pub file_size: u64,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying record file at {:?}", path);
    println!();

    let backend = FileBackend::open_with_options(path, false, false)?;
    let result = verify_records(&backend)?;
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Record file verification passed");
        Ok(())
    } else {
        println!("✗ Record file verification failed");
        Err("Verification failed".into())
    }
}

pub(crate) fn verify_records(
    backend: &dyn StorageBackend,
) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let mut result = VerifyResult {
        file_size: backend.size()?,
        ..VerifyResult::default()
    };
    let size = result.file_size;
    let mut seen: HashMap<EntityId, u64> = HashMap::new();
    let mut offset = 0u64;
    let mut header = [0u8; HEADER_SIZE];

    while offset < size {
        result.records_checked += 1;

        if offset + HEADER_SIZE as u64 > size {
            result.errors.push(format!(
                "Truncated header at offset {}: {} trailing bytes",
                offset,
                size - offset
            ));
            break;
        }
        backend.read_into(offset, &mut header)?;
        let decoded = RecordHeader::decode(&header);

        let len = match decoded.validate(offset, MAX_PAYLOAD_SIZE) {
            Ok(len) => len as u64,
            Err(e) => {
                result.errors.push(e.to_string());
                break;
            }
        };

        let end = offset + HEADER_SIZE as u64 + len;
        if end > size {
            result.errors.push(format!(
                "Truncated record at offset {}: needs {} bytes, only {} available",
                offset,
                HEADER_SIZE as u64 + len,
                size - offset
            ));
            break;
        }

        if let Some(previous) = seen.insert(decoded.key, offset) {
            result.duplicate_keys += 1;
            result.errors.push(format!(
                "Duplicate key {} at offsets {} and {}",
                decoded.key, previous, offset
            ));
        } else {
            result.valid_records += 1;
        }

        result.covered_bytes = end;
        offset = end;
    }

    if result.errors.is_empty() && result.covered_bytes != size {
        result.errors.push(format!(
            "Records cover {} bytes but file is {} bytes",
            result.covered_bytes, size
        ));
    }

    Ok(result)
}

fn print_result(result: &VerifyResult) {
    println!("  Records checked: {}", result.records_checked);
    println!("  Valid records:   {}", result.valid_records);
    println!("  Duplicate keys:  {}", result.duplicate_keys);
    println!(
        "  Covered bytes:   {} / {}",
        result.covered_bytes, result.file_size
    );

    if !result.errors.is_empty() {
        println!("  Errors:");
        for error in result.errors.iter().take(10) {
            println!("    - {}", error);
        }
        if result.errors.len() > 10 {
            println!("    ... and {} more", result.errors.len() - 10);
        }
    }
}
