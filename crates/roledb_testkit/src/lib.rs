//! # roledb Testkit
//!
//! Test utilities for roledb.
//!
//! This crate provides:
//! - Temporary record store fixtures that survive reopening
//! - Property-based test generators using proptest
//! - A reference model to compare store behavior against
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roledb_testkit::prelude::*;
//!
//! #[test]
//! fn survives_reopen() {
//!     let mut store = TestStore::new();
//!     store.put(EntityId::from_bytes([1; 16]), b"admin").unwrap();
//!     store.reopen();
//!     assert!(store.contains(EntityId::from_bytes([1; 16])).unwrap());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
    pub use roledb_core::{EntityId, RecordStore, StoreConfig};
}

pub use fixtures::*;
pub use generators::*;
pub use model::*;
