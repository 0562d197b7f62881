//! `warden-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage or transport concerns).

pub mod context;
pub mod entity;
pub mod error;
pub mod id;

pub use context::RequestContext;
pub use entity::Entity;
pub use error::{DomainError, DomainResult, EntityKind, ErrorKind};
pub use id::{RoleId, UserId};
