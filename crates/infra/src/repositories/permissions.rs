use std::sync::Arc;

use warden_auth::{NewPermission, Permission, PermissionName};
use warden_core::{DomainError, DomainResult, EntityKind};

use crate::pagination::{Page, PageLimits, PageRequest, paginate};
use crate::store::EntityStore;

/// Permissions are immutable once created; there is no update or delete.
pub struct PermissionRepo<S: ?Sized> {
    store: Arc<S>,
    limits: PageLimits,
}

impl<S: ?Sized> Clone for PermissionRepo<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            limits: self.limits,
        }
    }
}

impl<S: EntityStore + ?Sized> PermissionRepo<S> {
    pub fn new(store: Arc<S>, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    pub fn create(&self, new: NewPermission) -> DomainResult<Permission> {
        let permission = new.into_permission()?;
        Ok(self.store.insert_permission(permission)?)
    }

    pub fn get(&self, name: &PermissionName) -> DomainResult<Permission> {
        self.find(name)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Permission, name.as_str()))
    }

    pub fn find(&self, name: &PermissionName) -> DomainResult<Option<Permission>> {
        Ok(self.store.get_permission(name)?)
    }

    /// Permissions ordered by name; the filter matches the name or the
    /// resource type.
    pub fn list(&self, request: &PageRequest) -> DomainResult<Page<Permission>> {
        let matching: Vec<Permission> = self
            .store
            .list_permissions()?
            .into_iter()
            .filter(|p| p.matches_filter(&request.filter))
            .collect();
        paginate(matching, request, self.limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEntityStore;

    #[test]
    fn list_by_resource_type() {
        let repo = PermissionRepo::new(Arc::new(InMemoryEntityStore::new()), PageLimits::default());
        repo.create(NewPermission::new("users.read")).unwrap();
        repo.create(NewPermission::new("users.write")).unwrap();
        repo.create(NewPermission::new("roles.read")).unwrap();

        let page = repo.list(&PageRequest::first(10).with_filter("users")).unwrap();
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["users.read", "users.write"]);

        let exact = repo
            .list(&PageRequest::first(10).with_filter("roles.read"))
            .unwrap();
        assert_eq!(exact.total_size, 1);
    }

    #[test]
    fn unknown_permission_is_not_found() {
        let repo = PermissionRepo::new(Arc::new(InMemoryEntityStore::new()), PageLimits::default());
        let err = repo.get(&PermissionName::from("nope.read")).unwrap_err();
        assert!(err.is_not_found(EntityKind::Permission));
    }
}
