//! Authorization usecase: the business rules over the repositories.
//!
//! Every operation checks the request context on entry, validates input before
//! touching storage and reports failures as `DomainError`. Nothing is retried.

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use warden_auth::{
    AuthorizationExplanation, CredentialHash, CredentialHasher, NewPermission, NewRole, NewUser,
    Permission, PermissionName, Principal, Role, RoleChanges, RoleGrant, User, UserChanges,
    authorize, explain_authorization, validate,
};
use warden_core::{DomainError, DomainResult, EntityKind, RequestContext, RoleId, UserId};
use warden_infra::pagination::{Page, PageLimits, PageRequest};
use warden_infra::{EntityStore, Repositories};

/// Password hashed once per usecase and verified against when a login names
/// an unknown user, so that path costs one verification like any other.
const DECOY_PASSWORD: &str = "warden-decoy-credential";

pub struct AuthorizationUsecase<S: ?Sized> {
    repos: Repositories<S>,
    hasher: Arc<dyn CredentialHasher>,
    decoy: Arc<OnceLock<Option<CredentialHash>>>,
}

impl<S: ?Sized> Clone for AuthorizationUsecase<S> {
    fn clone(&self) -> Self {
        Self {
            repos: self.repos.clone(),
            hasher: self.hasher.clone(),
            decoy: self.decoy.clone(),
        }
    }
}

impl<S: EntityStore + ?Sized> AuthorizationUsecase<S> {
    pub fn new(store: Arc<S>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self::with_limits(store, hasher, PageLimits::default())
    }

    pub fn with_limits(
        store: Arc<S>,
        hasher: Arc<dyn CredentialHasher>,
        limits: PageLimits,
    ) -> Self {
        Self {
            repos: Repositories::new(store, limits),
            hasher,
            decoy: Arc::new(OnceLock::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_user(
        &self,
        ctx: &RequestContext,
        new: NewUser,
        password: &str,
    ) -> DomainResult<User> {
        ctx.ensure_active()?;
        let new = new.validated()?;
        validate::password(password)?;

        if self.repos.users.find_by_username(&new.username)?.is_some() {
            return Err(DomainError::already_exists(EntityKind::User, new.username));
        }

        let credential = self.hasher.hash(password)?;
        let user = self.repos.users.create(new, credential)?;
        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub fn get_user(&self, ctx: &RequestContext, id: &UserId) -> DomainResult<User> {
        ctx.ensure_active()?;
        self.repos.users.get(id)
    }

    /// Lookup by username. The input is trimmed the same way it is on create.
    pub fn get_user_by_username(&self, ctx: &RequestContext, username: &str) -> DomainResult<User> {
        ctx.ensure_active()?;
        let username = username.trim();
        self.repos
            .users
            .find_by_username(username)?
            .ok_or_else(|| DomainError::not_found(EntityKind::User, username))
    }

    /// Apply `changes` and, when given, replace the password.
    pub fn update_user(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        changes: UserChanges,
        password: Option<&str>,
    ) -> DomainResult<User> {
        ctx.ensure_active()?;
        let changes = changes.validated()?;
        if let Some(password) = password {
            validate::password(password)?;
        }

        let mut user = self.repos.users.get(id)?;

        if let Some(username) = changes.username.as_deref() {
            if username != user.username {
                if let Some(holder) = self.repos.users.find_by_username(username)? {
                    if holder.id != user.id {
                        return Err(DomainError::already_exists(EntityKind::User, username));
                    }
                }
            }
        }

        let credential = password.map(|p| self.hasher.hash(p)).transpose()?;

        user.apply(changes);
        let mut user = self.repos.users.update(user)?;

        if let Some(credential) = credential {
            self.repos.users.update_credential(id, credential)?;
            user = self.repos.users.get(id)?;
        }

        info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Delete the user and every role assignment it held.
    pub fn delete_user(&self, ctx: &RequestContext, id: &UserId) -> DomainResult<()> {
        ctx.ensure_active()?;
        self.repos.users.get(id)?;
        let user = self.repos.users.delete(id)?;
        info!(user_id = %user.id, username = %user.username, "user deleted");
        Ok(())
    }

    pub fn list_users(
        &self,
        ctx: &RequestContext,
        request: &PageRequest,
    ) -> DomainResult<Page<User>> {
        ctx.ensure_active()?;
        self.repos.users.list(request)
    }

    pub fn change_password(
        &self,
        ctx: &RequestContext,
        id: &UserId,
        new_password: &str,
    ) -> DomainResult<()> {
        ctx.ensure_active()?;
        validate::password(new_password)?;
        self.repos.users.get(id)?;

        let credential = self.hasher.hash(new_password)?;
        self.repos.users.update_credential(id, credential)?;
        info!(user_id = %id, "password changed");
        Ok(())
    }

    /// Check a username and password.
    ///
    /// Unknown usernames, wrong passwords and inactive accounts all fail with
    /// the same `InvalidCredentials` error, and every path runs one password
    /// verification.
    pub fn authenticate(
        &self,
        ctx: &RequestContext,
        username: &str,
        password: &str,
    ) -> DomainResult<User> {
        ctx.ensure_active()?;

        let Some(user) = self.repos.users.find_by_username(username.trim())? else {
            self.verify_decoy(password);
            warn!("authentication failed");
            return Err(DomainError::InvalidCredentials);
        };

        let credential = self.repos.users.credential(&user.id)?;
        if !self.hasher.verify(password, &credential) || !user.is_active {
            warn!(user_id = %user.id, "authentication failed");
            return Err(DomainError::InvalidCredentials);
        }

        debug!(user_id = %user.id, "authenticated");
        Ok(user)
    }

    fn verify_decoy(&self, password: &str) {
        let decoy = self
            .decoy
            .get_or_init(|| self.hasher.hash(DECOY_PASSWORD).ok());
        if let Some(decoy) = decoy {
            let _ = self.hasher.verify(password, decoy);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_role(&self, ctx: &RequestContext, new: NewRole) -> DomainResult<Role> {
        ctx.ensure_active()?;
        let new = new.validated()?;

        if self.repos.roles.find_by_name(&new.name)?.is_some() {
            return Err(DomainError::already_exists(EntityKind::Role, new.name));
        }

        let role = self.repos.roles.create(new)?;
        info!(role_id = %role.id, name = %role.name, "role created");
        Ok(role)
    }

    pub fn get_role(&self, ctx: &RequestContext, id: &RoleId) -> DomainResult<Role> {
        ctx.ensure_active()?;
        self.repos.roles.get(id)
    }

    /// Lookup by role name. The input is trimmed the same way it is on create.
    pub fn get_role_by_name(&self, ctx: &RequestContext, name: &str) -> DomainResult<Role> {
        ctx.ensure_active()?;
        let name = name.trim();
        self.repos
            .roles
            .find_by_name(name)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Role, name))
    }

    pub fn update_role(
        &self,
        ctx: &RequestContext,
        id: &RoleId,
        changes: RoleChanges,
    ) -> DomainResult<Role> {
        ctx.ensure_active()?;
        let changes = changes.validated()?;
        let mut role = self.repos.roles.get(id)?;

        if let Some(name) = changes.name.as_deref() {
            if name != role.name {
                if let Some(holder) = self.repos.roles.find_by_name(name)? {
                    if holder.id != role.id {
                        return Err(DomainError::already_exists(EntityKind::Role, name));
                    }
                }
            }
        }

        role.apply(changes);
        let role = self.repos.roles.update(role)?;
        info!(role_id = %role.id, "role updated");
        Ok(role)
    }

    /// Delete the role, removing it from every user and dropping its
    /// permission grants.
    pub fn delete_role(&self, ctx: &RequestContext, id: &RoleId) -> DomainResult<()> {
        ctx.ensure_active()?;
        self.repos.roles.get(id)?;
        let role = self.repos.roles.delete(id)?;
        info!(role_id = %role.id, name = %role.name, "role deleted");
        Ok(())
    }

    pub fn list_roles(
        &self,
        ctx: &RequestContext,
        request: &PageRequest,
    ) -> DomainResult<Page<Role>> {
        ctx.ensure_active()?;
        self.repos.roles.list(request)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_permission(
        &self,
        ctx: &RequestContext,
        new: NewPermission,
    ) -> DomainResult<Permission> {
        ctx.ensure_active()?;
        let name = PermissionName::new(validate::permission_name(&new.name)?);

        if self.repos.permissions.find(&name)?.is_some() {
            return Err(DomainError::already_exists(
                EntityKind::Permission,
                name.as_str(),
            ));
        }

        let permission = self.repos.permissions.create(new)?;
        info!(permission = %permission.name, "permission created");
        Ok(permission)
    }

    pub fn get_permission(
        &self,
        ctx: &RequestContext,
        name: &PermissionName,
    ) -> DomainResult<Permission> {
        ctx.ensure_active()?;
        self.repos.permissions.get(name)
    }

    pub fn list_permissions(
        &self,
        ctx: &RequestContext,
        request: &PageRequest,
    ) -> DomainResult<Page<Permission>> {
        ctx.ensure_active()?;
        self.repos.permissions.list(request)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User ↔ role
    // ─────────────────────────────────────────────────────────────────────────

    /// Give `user_id` the role. Assigning a role already held succeeds without
    /// change; the return value tells whether anything was added.
    pub fn assign_role_to_user(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> DomainResult<bool> {
        ctx.ensure_active()?;
        self.repos.users.get(user_id)?;
        self.repos.roles.get(role_id)?;

        if self.repos.user_roles.has(user_id, role_id)? {
            debug!(user_id = %user_id, role_id = %role_id, "role already assigned");
            return Ok(false);
        }

        // The store re-checks both ends under its locks.
        let added = self.repos.user_roles.assign(user_id, role_id)?;
        if added {
            info!(user_id = %user_id, role_id = %role_id, "role assigned");
        }
        Ok(added)
    }

    /// Removing an assignment that does not exist succeeds without change.
    pub fn remove_role_from_user(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> DomainResult<bool> {
        ctx.ensure_active()?;
        let removed = self.repos.user_roles.remove(user_id, role_id)?;
        if removed {
            info!(user_id = %user_id, role_id = %role_id, "role removed");
        } else {
            debug!(user_id = %user_id, role_id = %role_id, "role was not assigned");
        }
        Ok(removed)
    }

    pub fn has_user_role(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> DomainResult<bool> {
        ctx.ensure_active()?;
        self.repos.user_roles.has(user_id, role_id)
    }

    pub fn list_user_roles(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
    ) -> DomainResult<Vec<Role>> {
        ctx.ensure_active()?;
        self.repos.users.get(user_id)?;
        self.repos.user_roles.list_for_user(user_id)
    }

    pub fn list_role_users(
        &self,
        ctx: &RequestContext,
        role_id: &RoleId,
    ) -> DomainResult<Vec<User>> {
        ctx.ensure_active()?;
        self.repos.roles.get(role_id)?;
        self.repos.user_roles.list_for_role(role_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Role ↔ permission
    // ─────────────────────────────────────────────────────────────────────────

    pub fn add_permission_to_role(
        &self,
        ctx: &RequestContext,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> DomainResult<bool> {
        ctx.ensure_active()?;
        self.repos.roles.get(role_id)?;
        self.repos.permissions.get(permission)?;

        if self.repos.role_permissions.has(role_id, permission)? {
            debug!(role_id = %role_id, permission = %permission, "permission already granted");
            return Ok(false);
        }

        let added = self.repos.role_permissions.assign(role_id, permission)?;
        if added {
            info!(role_id = %role_id, permission = %permission, "permission granted");
        }
        Ok(added)
    }

    pub fn remove_permission_from_role(
        &self,
        ctx: &RequestContext,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> DomainResult<bool> {
        ctx.ensure_active()?;
        let removed = self.repos.role_permissions.remove(role_id, permission)?;
        if removed {
            info!(role_id = %role_id, permission = %permission, "permission revoked");
        } else {
            debug!(role_id = %role_id, permission = %permission, "permission was not granted");
        }
        Ok(removed)
    }

    pub fn has_role_permission(
        &self,
        ctx: &RequestContext,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> DomainResult<bool> {
        ctx.ensure_active()?;
        self.repos.role_permissions.has(role_id, permission)
    }

    pub fn list_role_permissions(
        &self,
        ctx: &RequestContext,
        role_id: &RoleId,
    ) -> DomainResult<Vec<Permission>> {
        ctx.ensure_active()?;
        self.repos.roles.get(role_id)?;
        self.repos.role_permissions.list_for_role(role_id)
    }

    pub fn list_permission_roles(
        &self,
        ctx: &RequestContext,
        permission: &PermissionName,
    ) -> DomainResult<Vec<Role>> {
        ctx.ensure_active()?;
        self.repos.permissions.get(permission)?;
        self.repos.role_permissions.list_for_permission(permission)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot of the user's roles and the permissions they grant.
    pub fn resolve_principal(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
    ) -> DomainResult<Principal> {
        ctx.ensure_active()?;
        let (user, grants) = self.repos.user_roles.grants(user_id)?;

        Ok(Principal {
            user_id: user.id,
            username: user.username,
            active: user.is_active,
            roles: grants
                .into_iter()
                .map(|(role, permissions)| RoleGrant {
                    role_id: role.id,
                    name: role.name,
                    permissions,
                })
                .collect(),
        })
    }

    pub fn check_permission(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
        permission: &PermissionName,
    ) -> DomainResult<bool> {
        let principal = self.resolve_principal(ctx, user_id)?;
        let granted = authorize(&principal, permission).is_ok();
        debug!(user_id = %user_id, permission = %permission, granted, "permission checked");
        Ok(granted)
    }

    pub fn explain_permission(
        &self,
        ctx: &RequestContext,
        user_id: &UserId,
        permission: &PermissionName,
    ) -> DomainResult<AuthorizationExplanation> {
        let principal = self.resolve_principal(ctx, user_id)?;
        Ok(explain_authorization(&principal, permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warden_auth::Argon2Hasher;
    use warden_core::ErrorKind;
    use warden_infra::InMemoryEntityStore;

    fn usecase() -> AuthorizationUsecase<InMemoryEntityStore> {
        let hasher = Argon2Hasher::with_params(8, 1, 1).unwrap();
        AuthorizationUsecase::new(Arc::new(InMemoryEntityStore::new()), Arc::new(hasher))
    }

    /// Cheap Argon2 hasher that counts verifications.
    struct CountingHasher {
        inner: Argon2Hasher,
        verifications: AtomicUsize,
    }

    impl CredentialHasher for CountingHasher {
        fn hash(&self, password: &str) -> DomainResult<CredentialHash> {
            self.inner.hash(password)
        }

        fn verify(&self, password: &str, hash: &CredentialHash) -> bool {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(password, hash)
        }
    }

    #[test]
    fn invalid_input_never_reaches_storage() {
        let uc = usecase();
        let ctx = RequestContext::background();

        let err = uc.create_user(&ctx, NewUser::new("   "), "pw").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = uc.create_user(&ctx, NewUser::new("alice"), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert_eq!(
            uc.list_users(&ctx, &PageRequest::default())
                .unwrap()
                .total_size,
            0
        );
    }

    #[test]
    fn rename_collision_is_already_exists() {
        let uc = usecase();
        let ctx = RequestContext::background();
        uc.create_user(&ctx, NewUser::new("alice"), "pw").unwrap();
        let bob = uc.create_user(&ctx, NewUser::new("bob"), "pw").unwrap();

        let changes = UserChanges {
            username: Some("alice".to_string()),
            ..Default::default()
        };
        let err = uc.update_user(&ctx, &bob.id, changes, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn update_with_password_replaces_credential() {
        let uc = usecase();
        let ctx = RequestContext::background();
        let alice = uc.create_user(&ctx, NewUser::new("alice"), "old").unwrap();

        uc.update_user(&ctx, &alice.id, UserChanges::default(), Some("new"))
            .unwrap();

        assert!(uc.authenticate(&ctx, "alice", "old").is_err());
        assert!(uc.authenticate(&ctx, "alice", "new").is_ok());
    }

    #[test]
    fn unknown_username_still_runs_one_verification() {
        let hasher = Arc::new(CountingHasher {
            inner: Argon2Hasher::with_params(8, 1, 1).unwrap(),
            verifications: AtomicUsize::new(0),
        });
        let uc = AuthorizationUsecase::new(Arc::new(InMemoryEntityStore::new()), hasher.clone());
        let ctx = RequestContext::background();
        uc.create_user(&ctx, NewUser::new("alice"), "pw").unwrap();

        let unknown = uc.authenticate(&ctx, "mallory", "pw").unwrap_err();
        assert_eq!(unknown, DomainError::InvalidCredentials);
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 1);

        let wrong = uc.authenticate(&ctx, "alice", "nope").unwrap_err();
        assert_eq!(wrong, unknown);
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 2);

        uc.authenticate(&ctx, "mallory", "pw").unwrap_err();
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn lookups_by_natural_key_trim_input() {
        let uc = usecase();
        let ctx = RequestContext::background();
        let alice = uc.create_user(&ctx, NewUser::new(" alice "), "pw").unwrap();
        let admin = uc.create_role(&ctx, NewRole::new(" admin ")).unwrap();

        assert_eq!(uc.get_user_by_username(&ctx, "  alice ").unwrap().id, alice.id);
        assert_eq!(uc.get_role_by_name(&ctx, "admin  ").unwrap().id, admin.id);

        let err = uc.get_user_by_username(&ctx, " bob ").unwrap_err();
        assert_eq!(err, DomainError::not_found(EntityKind::User, "bob"));
    }

    #[test]
    fn remove_does_not_require_existing_entities() {
        let uc = usecase();
        let ctx = RequestContext::background();
        assert!(
            !uc.remove_role_from_user(&ctx, &UserId::new(), &RoleId::new())
                .unwrap()
        );
        assert!(
            !uc.remove_permission_from_role(&ctx, &RoleId::new(), &PermissionName::from("x.y"))
                .unwrap()
        );
    }

    #[test]
    fn duplicate_permission_is_rejected() {
        let uc = usecase();
        let ctx = RequestContext::background();
        uc.create_permission(&ctx, NewPermission::new("users.read"))
            .unwrap();
        let err = uc
            .create_permission(&ctx, NewPermission::new(" users.read "))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }
}
