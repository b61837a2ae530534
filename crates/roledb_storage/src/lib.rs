//! # roledb storage
//!
//! Storage backend trait and implementations for roledb.
//!
//! Backends are **opaque positional byte stores**. They know nothing about
//! record headers, keys, or the pointer index; `roledb_core` owns all format
//! interpretation.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (read, write, append, extend, truncate)
//! - Positional writes are allowed anywhere inside `[0, size]`
//! - Must be `Send + Sync` so the owning store can live behind a lock
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use roledb_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! backend.write_at(offset, b"j").unwrap();
//! assert_eq!(backend.read_at(offset, 11).unwrap(), b"jello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
