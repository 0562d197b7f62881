use std::sync::Arc;

use chrono::Utc;

use warden_auth::{CredentialHash, NewUser, User};
use warden_core::{DomainError, DomainResult, EntityKind, UserId};

use crate::pagination::{Page, PageLimits, PageRequest, paginate};
use crate::store::EntityStore;

pub struct UserRepo<S: ?Sized> {
    store: Arc<S>,
    limits: PageLimits,
}

impl<S: ?Sized> Clone for UserRepo<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            limits: self.limits,
        }
    }
}

impl<S: EntityStore + ?Sized> UserRepo<S> {
    pub fn new(store: Arc<S>, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    /// Insert a new active user. The id is generated when the input has none.
    pub fn create(&self, new: NewUser, credential: CredentialHash) -> DomainResult<User> {
        let user = User::from_new(new, Utc::now());
        Ok(self.store.insert_user(user, credential)?)
    }

    pub fn get(&self, id: &UserId) -> DomainResult<User> {
        self.find(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::User, id.to_string()))
    }

    pub fn find(&self, id: &UserId) -> DomainResult<Option<User>> {
        Ok(self.store.get_user(id)?)
    }

    pub fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self.store.find_user_by_username(username)?)
    }

    /// Persist `user`, refreshing `updated_at`. `created_at` is kept from the
    /// stored record whatever the caller passes.
    pub fn update(&self, mut user: User) -> DomainResult<User> {
        user.updated_at = Utc::now();
        Ok(self.store.replace_user(user)?)
    }

    /// Remove the user together with all of its role assignments.
    pub fn delete(&self, id: &UserId) -> DomainResult<User> {
        Ok(self.store.remove_user(id)?)
    }

    /// Users ordered by username; the filter matches username or email.
    pub fn list(&self, request: &PageRequest) -> DomainResult<Page<User>> {
        let matching: Vec<User> = self
            .store
            .list_users()?
            .into_iter()
            .filter(|u| u.matches_filter(&request.filter))
            .collect();
        paginate(matching, request, self.limits)
    }

    pub fn credential(&self, id: &UserId) -> DomainResult<CredentialHash> {
        self.store
            .user_credential(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::User, id.to_string()))
    }

    pub fn update_credential(&self, id: &UserId, credential: CredentialHash) -> DomainResult<()> {
        Ok(self.store.set_user_credential(id, credential, Utc::now())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryEntityStore;
    use warden_core::ErrorKind;

    fn repo() -> UserRepo<InMemoryEntityStore> {
        UserRepo::new(Arc::new(InMemoryEntityStore::new()), PageLimits::default())
    }

    fn hash() -> CredentialHash {
        CredentialHash::new("$test")
    }

    #[test]
    fn create_assigns_id_and_activates() {
        let repo = repo();
        let user = repo.create(NewUser::new("alice"), hash()).unwrap();
        assert!(user.is_active);
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(repo.get(&user.id).unwrap(), user);
    }

    #[test]
    fn create_keeps_supplied_id() {
        let repo = repo();
        let id = UserId::new();
        let user = repo.create(NewUser::new("alice").with_id(id), hash()).unwrap();
        assert_eq!(user.id, id);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let err = repo().get(&UserId::new()).unwrap_err();
        assert!(err.is_not_found(EntityKind::User));
    }

    #[test]
    fn update_refreshes_updated_at_only() {
        let repo = repo();
        let user = repo.create(NewUser::new("alice"), hash()).unwrap();

        let mut changed = user.clone();
        changed.email = "alice@example.com".to_string();
        let stored = repo.update(changed).unwrap();

        assert_eq!(stored.created_at, user.created_at);
        assert!(stored.updated_at >= user.updated_at);
        assert_eq!(stored.email, "alice@example.com");
    }

    #[test]
    fn update_unknown_is_not_found() {
        let repo = repo();
        let ghost = User::from_new(NewUser::new("ghost"), Utc::now());
        assert_eq!(repo.update(ghost).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn list_filters_by_username_or_email() {
        let repo = repo();
        repo.create(NewUser::new("bob").with_email("bob@example.com"), hash())
            .unwrap();
        repo.create(NewUser::new("alice"), hash()).unwrap();

        let all = repo.list(&PageRequest::first(10)).unwrap();
        let names: Vec<_> = all.items.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);

        let by_email = repo
            .list(&PageRequest::first(10).with_filter("bob@example.com"))
            .unwrap();
        assert_eq!(by_email.total_size, 1);
        assert_eq!(by_email.items[0].username, "bob");
    }

    #[test]
    fn credential_is_replaceable() {
        let repo = repo();
        let user = repo.create(NewUser::new("alice"), hash()).unwrap();
        repo.update_credential(&user.id, CredentialHash::new("$other"))
            .unwrap();
        assert_eq!(repo.credential(&user.id).unwrap().as_str(), "$other");
        assert!(repo.credential(&UserId::new()).is_err());
    }
}
