use std::sync::Arc;

use warden_auth::{Role, User};
use warden_core::{DomainResult, RoleId, UserId};

use crate::store::{EntityStore, RoleWithPermissions};

/// User to role membership.
pub struct UserRoleRepo<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for UserRoleRepo<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: EntityStore + ?Sized> UserRoleRepo<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `Ok(true)` if the assignment is new, `Ok(false)` if it was already held.
    pub fn assign(&self, user_id: &UserId, role_id: &RoleId) -> DomainResult<bool> {
        Ok(self.store.link_user_role(user_id, role_id)?)
    }

    /// `Ok(false)` when there was nothing to remove.
    pub fn remove(&self, user_id: &UserId, role_id: &RoleId) -> DomainResult<bool> {
        Ok(self.store.unlink_user_role(user_id, role_id)?)
    }

    pub fn has(&self, user_id: &UserId, role_id: &RoleId) -> DomainResult<bool> {
        Ok(self.store.has_user_role(user_id, role_id)?)
    }

    pub fn list_for_user(&self, user_id: &UserId) -> DomainResult<Vec<Role>> {
        Ok(self.store.roles_of_user(user_id)?)
    }

    pub fn list_for_role(&self, role_id: &RoleId) -> DomainResult<Vec<User>> {
        Ok(self.store.users_of_role(role_id)?)
    }

    /// The user with every held role and that role's permission names.
    pub fn grants(&self, user_id: &UserId) -> DomainResult<(User, Vec<RoleWithPermissions>)> {
        Ok(self.store.user_grants(user_id)?)
    }
}
