//! roledb CLI
//!
//! Offline tools for a roledb record file. Run these only while no server
//! has the file open; the store takes an exclusive lock and will refuse.
//!
//! # Commands
//!
//! - `inspect` - Display file statistics
//! - `list` - List records in file order
//! - `get` / `put` / `remove` - Direct record access
//! - `verify` - Check the file's record framing

mod commands;

use clap::{Parser, Subcommand};
use roledb_core::EntityId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// roledb command-line tools.
#[derive(Parser)]
#[command(name = "roledb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the record file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display file statistics
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List every record in file order
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the payload stored for a key
    Get {
        /// Entity UUID
        key: EntityId,

        /// Print the payload as hex instead of text
        #[arg(long)]
        hex: bool,
    },

    /// Store a payload for a key
    Put {
        /// Entity UUID
        key: EntityId,

        /// Payload text
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        value: Option<String>,

        /// Read the payload from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Remove the record for a key
    Remove {
        /// Entity UUID
        key: EntityId,
    },

    /// Verify record framing and the packing invariant
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Record file path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::List { format } => {
            let path = cli.path.ok_or("Record file path required for list")?;
            commands::list::run(&path, &format)?;
        }
        Commands::Get { key, hex } => {
            let path = cli.path.ok_or("Record file path required for get")?;
            commands::record::get(&path, key, hex)?;
        }
        Commands::Put { key, value, file } => {
            let path = cli.path.ok_or("Record file path required for put")?;
            let payload = match (value, file) {
                (_, Some(file)) => std::fs::read(file)?,
                (Some(value), None) => value.into_bytes(),
                (None, None) => return Err("either a value or --file is required".into()),
            };
            commands::record::put(&path, key, &payload)?;
        }
        Commands::Remove { key } => {
            let path = cli.path.ok_or("Record file path required for remove")?;
            commands::record::remove(&path, key)?;
        }
        Commands::Verify => {
            let path = cli.path.ok_or("Record file path required for verify")?;
            commands::verify::run(&path)?;
        }
        Commands::Version => {
            println!("roledb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("roledb core v{}", roledb_core::VERSION);
        }
    }

    Ok(())
}
