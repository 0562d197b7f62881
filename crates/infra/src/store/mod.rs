//! Entity storage boundary.
//!
//! The store is the single owner of every identity record and relation. It
//! enforces natural-key uniqueness and referential integrity at the level of a
//! single call; business rules live above it.

pub mod in_memory;
mod relation;
pub mod r#trait;

pub use in_memory::InMemoryEntityStore;
pub use r#trait::{EntityStore, RoleWithPermissions, StoreError};
