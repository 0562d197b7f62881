use thiserror::Error;

use warden_auth::{CredentialHash, Permission, PermissionName, Role, User};
use warden_core::{DomainError, EntityKind, RoleId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: EntityKind, key: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: EntityKind, key: String },

    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl StoreError {
    pub fn not_found(entity: EntityKind, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn already_exists(entity: EntityKind, key: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { entity, key } => DomainError::NotFound { entity, key },
            StoreError::AlreadyExists { entity, key } => DomainError::AlreadyExists { entity, key },
            StoreError::LockPoisoned(set) => DomainError::internal(format!("lock poisoned: {set}")),
        }
    }
}

/// A role together with the permission names linked to it.
pub type RoleWithPermissions = (Role, Vec<PermissionName>);

/// Storage contract for identities, roles, permissions and their relations.
///
/// Implementations must uphold, atomically per call:
/// - natural-key uniqueness (username, role name, permission name);
/// - referential integrity: `link_*` checks that both ends exist inside the
///   same critical section as the insert, and `remove_*` prunes every relation
///   referencing the removed record before returning;
/// - immutability of `created_at` on replace.
///
/// Listing methods return snapshots ordered by natural key. They do not filter
/// or paginate; that belongs to the repositories.
pub trait EntityStore: Send + Sync {
    // ── users ────────────────────────────────────────────────────────────────

    fn insert_user(&self, user: User, credential: CredentialHash) -> Result<User, StoreError>;
    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    /// Replace the record with the same id, re-indexing the username if it changed.
    fn replace_user(&self, user: User) -> Result<User, StoreError>;
    /// Remove the user and every user→role relation that references it.
    fn remove_user(&self, id: &UserId) -> Result<User, StoreError>;
    fn list_users(&self) -> Result<Vec<User>, StoreError>;
    fn user_credential(&self, id: &UserId) -> Result<Option<CredentialHash>, StoreError>;
    /// Replace the stored hash and stamp the user's `updated_at`.
    fn set_user_credential(
        &self,
        id: &UserId,
        credential: CredentialHash,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError>;

    // ── roles ────────────────────────────────────────────────────────────────

    fn insert_role(&self, role: Role) -> Result<Role, StoreError>;
    fn get_role(&self, id: &RoleId) -> Result<Option<Role>, StoreError>;
    fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError>;
    fn replace_role(&self, role: Role) -> Result<Role, StoreError>;
    /// Remove the role, its role→permission relations and every user→role
    /// relation that references it.
    fn remove_role(&self, id: &RoleId) -> Result<Role, StoreError>;
    fn list_roles(&self) -> Result<Vec<Role>, StoreError>;

    // ── permissions ──────────────────────────────────────────────────────────

    fn insert_permission(&self, permission: Permission) -> Result<Permission, StoreError>;
    fn get_permission(&self, name: &PermissionName) -> Result<Option<Permission>, StoreError>;
    fn list_permissions(&self) -> Result<Vec<Permission>, StoreError>;

    // ── user ↔ role ──────────────────────────────────────────────────────────

    /// Returns `true` when a new relation was created, `false` when it already
    /// existed. Fails with `NotFound` (user checked first) if either end is missing.
    fn link_user_role(&self, user_id: &UserId, role_id: &RoleId) -> Result<bool, StoreError>;
    /// Returns `true` when a relation was removed. Never fails on absence.
    fn unlink_user_role(&self, user_id: &UserId, role_id: &RoleId) -> Result<bool, StoreError>;
    fn has_user_role(&self, user_id: &UserId, role_id: &RoleId) -> Result<bool, StoreError>;
    /// Roles held by the user; `NotFound` if the user does not exist.
    fn roles_of_user(&self, user_id: &UserId) -> Result<Vec<Role>, StoreError>;
    /// Users holding the role; `NotFound` if the role does not exist.
    fn users_of_role(&self, role_id: &RoleId) -> Result<Vec<User>, StoreError>;

    // ── role ↔ permission ────────────────────────────────────────────────────

    fn link_role_permission(
        &self,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> Result<bool, StoreError>;
    fn unlink_role_permission(
        &self,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> Result<bool, StoreError>;
    fn has_role_permission(
        &self,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> Result<bool, StoreError>;
    fn permissions_of_role(&self, role_id: &RoleId) -> Result<Vec<Permission>, StoreError>;
    fn roles_of_permission(&self, permission: &PermissionName) -> Result<Vec<Role>, StoreError>;

    // ── resolution ───────────────────────────────────────────────────────────

    /// The user plus each held role with its permission names, read as one
    /// consistent snapshot.
    fn user_grants(&self, user_id: &UserId) -> Result<(User, Vec<RoleWithPermissions>), StoreError>;
}
