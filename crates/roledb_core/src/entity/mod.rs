//! Entity identifiers.

mod id;

pub use id::EntityId;
