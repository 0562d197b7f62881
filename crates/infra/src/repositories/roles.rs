use std::sync::Arc;

use chrono::Utc;

use warden_auth::{NewRole, Role};
use warden_core::{DomainError, DomainResult, EntityKind, RoleId};

use crate::pagination::{Page, PageLimits, PageRequest, paginate};
use crate::store::EntityStore;

pub struct RoleRepo<S: ?Sized> {
    store: Arc<S>,
    limits: PageLimits,
}

impl<S: ?Sized> Clone for RoleRepo<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            limits: self.limits,
        }
    }
}

impl<S: EntityStore + ?Sized> RoleRepo<S> {
    pub fn new(store: Arc<S>, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    pub fn create(&self, new: NewRole) -> DomainResult<Role> {
        let role = Role::from_new(new, Utc::now());
        Ok(self.store.insert_role(role)?)
    }

    pub fn get(&self, id: &RoleId) -> DomainResult<Role> {
        self.find(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Role, id.to_string()))
    }

    pub fn find(&self, id: &RoleId) -> DomainResult<Option<Role>> {
        Ok(self.store.get_role(id)?)
    }

    pub fn find_by_name(&self, name: &str) -> DomainResult<Option<Role>> {
        Ok(self.store.find_role_by_name(name)?)
    }

    pub fn update(&self, mut role: Role) -> DomainResult<Role> {
        role.updated_at = Utc::now();
        Ok(self.store.replace_role(role)?)
    }

    /// Remove the role, detaching it from every user and dropping its
    /// permission links.
    pub fn delete(&self, id: &RoleId) -> DomainResult<Role> {
        Ok(self.store.remove_role(id)?)
    }

    /// Roles ordered by name; the filter matches the name.
    pub fn list(&self, request: &PageRequest) -> DomainResult<Page<Role>> {
        let matching: Vec<Role> = self
            .store
            .list_roles()?
            .into_iter()
            .filter(|r| r.matches_filter(&request.filter))
            .collect();
        paginate(matching, request, self.limits)
    }
}
