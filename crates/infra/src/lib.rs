//! Infrastructure layer: entity storage, repositories and pagination.

pub mod pagination;
pub mod repositories;
pub mod store;

pub use pagination::{Page, PageLimits, PageRequest};
pub use repositories::{
    PermissionRepo, Repositories, RolePermissionRepo, RoleRepo, UserRoleRepo, UserRepo,
};
pub use store::{EntityStore, InMemoryEntityStore, StoreError};
