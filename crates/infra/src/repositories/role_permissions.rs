use std::sync::Arc;

use warden_auth::{Permission, PermissionName, Role};
use warden_core::{DomainResult, RoleId};

use crate::store::EntityStore;

/// Role to permission grants.
pub struct RolePermissionRepo<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for RolePermissionRepo<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: EntityStore + ?Sized> RolePermissionRepo<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn assign(&self, role_id: &RoleId, permission: &PermissionName) -> DomainResult<bool> {
        Ok(self.store.link_role_permission(role_id, permission)?)
    }

    pub fn remove(&self, role_id: &RoleId, permission: &PermissionName) -> DomainResult<bool> {
        Ok(self.store.unlink_role_permission(role_id, permission)?)
    }

    pub fn has(&self, role_id: &RoleId, permission: &PermissionName) -> DomainResult<bool> {
        Ok(self.store.has_role_permission(role_id, permission)?)
    }

    pub fn list_for_role(&self, role_id: &RoleId) -> DomainResult<Vec<Permission>> {
        Ok(self.store.permissions_of_role(role_id)?)
    }

    pub fn list_for_permission(&self, permission: &PermissionName) -> DomainResult<Vec<Role>> {
        Ok(self.store.roles_of_permission(permission)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{PermissionRepo, RoleRepo};
    use crate::pagination::PageLimits;
    use crate::store::InMemoryEntityStore;
    use warden_auth::{NewPermission, NewRole};
    use warden_core::EntityKind;

    #[test]
    fn assign_names_the_missing_side() {
        let store = Arc::new(InMemoryEntityStore::new());
        let roles = RoleRepo::new(store.clone(), PageLimits::default());
        let permissions = PermissionRepo::new(store.clone(), PageLimits::default());
        let grants = RolePermissionRepo::new(store);

        let admin = roles.create(NewRole::new("admin")).unwrap();
        let read = PermissionName::from("users.read");

        let err = grants.assign(&admin.id, &read).unwrap_err();
        assert!(err.is_not_found(EntityKind::Permission));

        permissions.create(NewPermission::new("users.read")).unwrap();
        let err = grants.assign(&RoleId::new(), &read).unwrap_err();
        assert!(err.is_not_found(EntityKind::Role));

        assert!(grants.assign(&admin.id, &read).unwrap());
        assert!(!grants.assign(&admin.id, &read).unwrap());
        assert_eq!(grants.list_for_permission(&read).unwrap(), vec![admin.clone()]);

        assert!(grants.remove(&admin.id, &read).unwrap());
        assert!(!grants.remove(&admin.id, &read).unwrap());
        assert!(grants.list_for_role(&admin.id).unwrap().is_empty());
    }
}
