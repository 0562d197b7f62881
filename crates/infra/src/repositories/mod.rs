//! Repositories over the entity store.
//!
//! A repository holds nothing but a handle to the store and its page limits.
//! It stamps timestamps, turns storage misses into domain `NotFound` errors and
//! applies list filters and pagination. Uniqueness and referential checks are
//! delegated to the store so they happen inside its critical sections.

pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod user_roles;
pub mod users;

pub use permissions::PermissionRepo;
pub use role_permissions::RolePermissionRepo;
pub use roles::RoleRepo;
pub use user_roles::UserRoleRepo;
pub use users::UserRepo;

use std::sync::Arc;

use crate::pagination::PageLimits;
use crate::store::EntityStore;

/// All five repositories sharing one store.
pub struct Repositories<S: ?Sized> {
    pub users: UserRepo<S>,
    pub roles: RoleRepo<S>,
    pub permissions: PermissionRepo<S>,
    pub user_roles: UserRoleRepo<S>,
    pub role_permissions: RolePermissionRepo<S>,
}

impl<S: EntityStore + ?Sized> Repositories<S> {
    pub fn new(store: Arc<S>, limits: PageLimits) -> Self {
        Self {
            users: UserRepo::new(store.clone(), limits),
            roles: RoleRepo::new(store.clone(), limits),
            permissions: PermissionRepo::new(store.clone(), limits),
            user_roles: UserRoleRepo::new(store.clone()),
            role_permissions: RolePermissionRepo::new(store),
        }
    }
}

impl<S: ?Sized> Clone for Repositories<S> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            roles: self.roles.clone(),
            permissions: self.permissions.clone(),
            user_roles: self.user_roles.clone(),
            role_permissions: self.role_permissions.clone(),
        }
    }
}
