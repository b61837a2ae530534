//! List command implementation.

use super::open_store;
use serde::Serialize;
use std::path::Path;

/// One listed record.
#[derive(Debug, Serialize)]
pub struct ListedRecord {
    /// Entity UUID.
    pub key: String,
    /// Header offset.
    pub offset: u64,
    /// Payload length.
    pub length: u32,
}

/// Runs the list command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let records: Vec<ListedRecord> = store
        .scan()?
        .into_iter()
        .map(|r| ListedRecord {
            key: r.key.to_string(),
            offset: r.offset,
            length: r.length,
        })
        .collect();
    store.close()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        _ => {
            println!("{:<36}  {:>12}  {:>8}", "KEY", "OFFSET", "LENGTH");
            for record in &records {
                println!(
                    "{:<36}  {:>12}  {:>8}",
                    record.key, record.offset, record.length
                );
            }
            println!();
            println!("{} record(s)", records.len());
        }
    }

    Ok(())
}
