//! Inspect command implementation.

use super::{format_size, open_store};
use roledb_core::RecordInfo;
use serde::Serialize;
use std::path::Path;

/// File inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Record file path.
    pub path: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Number of records.
    pub record_count: usize,
    /// Sum of payload lengths.
    pub payload_bytes: u64,
    /// Bytes spent on record headers.
    pub header_bytes: u64,
    /// Largest payload, if any records exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_payload: Option<u32>,
}

impl InspectResult {
    fn from_records(path: &Path, file_size: u64, records: &[RecordInfo]) -> Self {
        let payload_bytes = records.iter().map(|r| u64::from(r.length)).sum();
        Self {
            path: path.display().to_string(),
            file_size,
            record_count: records.len(),
            payload_bytes,
            header_bytes: (records.len() * roledb_core::HEADER_SIZE) as u64,
            largest_payload: records.iter().map(|r| r.length).max(),
        }
    }
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let records = store.scan()?;
    let result = InspectResult::from_records(path, store.file_size()?, &records);
    store.close()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("roledb Record File");
    println!("==================");
    println!();
    println!("Path:          {}", result.path);
    println!("File size:     {}", format_size(result.file_size));
    println!("Records:       {}", result.record_count);
    println!("Payload bytes: {}", format_size(result.payload_bytes));
    println!("Header bytes:  {}", format_size(result.header_bytes));
    if let Some(largest) = result.largest_payload {
        println!("Largest:       {}", format_size(u64::from(largest)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roledb_core::EntityId;

    #[test]
    fn totals_add_up_to_file_size() {
        let records = vec![
            RecordInfo {
                key: EntityId::from_bytes([1; 16]),
                offset: 0,
                length: 3,
            },
            RecordInfo {
                key: EntityId::from_bytes([2; 16]),
                offset: 23,
                length: 10,
            },
        ];

        let result = InspectResult::from_records(Path::new("roles"), 53, &records);
        assert_eq!(result.record_count, 2);
        assert_eq!(result.payload_bytes + result.header_bytes, result.file_size);
        assert_eq!(result.largest_payload, Some(10));
    }
}
