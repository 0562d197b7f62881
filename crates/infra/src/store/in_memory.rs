use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use warden_auth::{CredentialHash, Permission, PermissionName, Role, User};
use warden_core::{Entity, EntityKind, RoleId, UserId};

use super::r#trait::{EntityStore, RoleWithPermissions, StoreError};
use super::relation::Relation;

#[derive(Debug)]
struct UserRow {
    user: User,
    credential: CredentialHash,
}

#[derive(Debug, Default)]
struct UserTable {
    by_id: HashMap<UserId, UserRow>,
    by_username: HashMap<String, UserId>,
}

#[derive(Debug, Default)]
struct RoleTable {
    by_id: HashMap<RoleId, Role>,
    by_name: HashMap<String, RoleId>,
}

/// In-memory entity store.
///
/// Each record set sits behind its own `RwLock`. Operations spanning several
/// sets always acquire them in one global order (users, roles, permissions,
/// user roles, role permissions), so multi-lock critical sections cannot
/// deadlock against each other.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    users: RwLock<UserTable>,
    roles: RwLock<RoleTable>,
    permissions: RwLock<HashMap<PermissionName, Permission>>,
    user_roles: RwLock<Relation<UserId, RoleId>>,
    role_permissions: RwLock<Relation<RoleId, PermissionName>>,
}

fn read<'a, T>(
    lock: &'a RwLock<T>,
    set: &'static str,
) -> Result<RwLockReadGuard<'a, T>, StoreError> {
    lock.read().map_err(|_| StoreError::LockPoisoned(set))
}

fn write<'a, T>(
    lock: &'a RwLock<T>,
    set: &'static str,
) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
    lock.write().map_err(|_| StoreError::LockPoisoned(set))
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users_read(&self) -> Result<RwLockReadGuard<'_, UserTable>, StoreError> {
        read(&self.users, "users")
    }

    fn users_write(&self) -> Result<RwLockWriteGuard<'_, UserTable>, StoreError> {
        write(&self.users, "users")
    }

    fn roles_read(&self) -> Result<RwLockReadGuard<'_, RoleTable>, StoreError> {
        read(&self.roles, "roles")
    }

    fn roles_write(&self) -> Result<RwLockWriteGuard<'_, RoleTable>, StoreError> {
        write(&self.roles, "roles")
    }

    fn permissions_read(
        &self,
    ) -> Result<RwLockReadGuard<'_, HashMap<PermissionName, Permission>>, StoreError> {
        read(&self.permissions, "permissions")
    }

    fn user_roles_read(&self) -> Result<RwLockReadGuard<'_, Relation<UserId, RoleId>>, StoreError> {
        read(&self.user_roles, "user_roles")
    }

    fn user_roles_write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, Relation<UserId, RoleId>>, StoreError> {
        write(&self.user_roles, "user_roles")
    }

    fn role_permissions_read(
        &self,
    ) -> Result<RwLockReadGuard<'_, Relation<RoleId, PermissionName>>, StoreError> {
        read(&self.role_permissions, "role_permissions")
    }

    fn role_permissions_write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, Relation<RoleId, PermissionName>>, StoreError> {
        write(&self.role_permissions, "role_permissions")
    }
}

impl EntityStore for InMemoryEntityStore {
    fn insert_user(&self, user: User, credential: CredentialHash) -> Result<User, StoreError> {
        let mut users = self.users_write()?;

        if users.by_id.contains_key(user.id()) {
            return Err(StoreError::already_exists(EntityKind::User, user.id));
        }
        if users.by_username.contains_key(&user.username) {
            return Err(StoreError::already_exists(EntityKind::User, &user.username));
        }

        users.by_username.insert(user.username.clone(), user.id);
        users.by_id.insert(
            user.id,
            UserRow {
                user: user.clone(),
                credential,
            },
        );
        Ok(user)
    }

    fn get_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let users = self.users_read()?;
        Ok(users.by_id.get(id).map(|row| row.user.clone()))
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users_read()?;
        Ok(users
            .by_username
            .get(username)
            .and_then(|id| users.by_id.get(id))
            .map(|row| row.user.clone()))
    }

    fn replace_user(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = self.users_write()?;
        let table = &mut *users;

        let row = table
            .by_id
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::not_found(EntityKind::User, user.id))?;

        if row.user.username != user.username {
            if let Some(holder) = table.by_username.get(&user.username) {
                if *holder != user.id {
                    return Err(StoreError::already_exists(EntityKind::User, &user.username));
                }
            }
            table.by_username.remove(&row.user.username);
            table.by_username.insert(user.username.clone(), user.id);
        }

        user.created_at = row.user.created_at;
        row.user = user.clone();
        Ok(user)
    }

    fn remove_user(&self, id: &UserId) -> Result<User, StoreError> {
        let mut users = self.users_write()?;
        let mut user_roles = self.user_roles_write()?;

        let row = users
            .by_id
            .remove(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::User, id))?;
        users.by_username.remove(&row.user.username);
        user_roles.remove_left(id);

        Ok(row.user)
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users_read()?;
        let mut list: Vec<User> = users.by_id.values().map(|row| row.user.clone()).collect();
        list.sort_by(|a, b| a.natural_key().cmp(b.natural_key()));
        Ok(list)
    }

    fn user_credential(&self, id: &UserId) -> Result<Option<CredentialHash>, StoreError> {
        let users = self.users_read()?;
        Ok(users.by_id.get(id).map(|row| row.credential.clone()))
    }

    fn set_user_credential(
        &self,
        id: &UserId,
        credential: CredentialHash,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut users = self.users_write()?;
        let row = users
            .by_id
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::User, id))?;
        row.credential = credential;
        row.user.updated_at = updated_at;
        Ok(())
    }

    fn insert_role(&self, role: Role) -> Result<Role, StoreError> {
        let mut roles = self.roles_write()?;

        if roles.by_id.contains_key(role.id()) {
            return Err(StoreError::already_exists(EntityKind::Role, role.id));
        }
        if roles.by_name.contains_key(&role.name) {
            return Err(StoreError::already_exists(EntityKind::Role, &role.name));
        }

        roles.by_name.insert(role.name.clone(), role.id);
        roles.by_id.insert(role.id, role.clone());
        Ok(role)
    }

    fn get_role(&self, id: &RoleId) -> Result<Option<Role>, StoreError> {
        let roles = self.roles_read()?;
        Ok(roles.by_id.get(id).cloned())
    }

    fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let roles = self.roles_read()?;
        Ok(roles
            .by_name
            .get(name)
            .and_then(|id| roles.by_id.get(id))
            .cloned())
    }

    fn replace_role(&self, mut role: Role) -> Result<Role, StoreError> {
        let mut roles = self.roles_write()?;
        let table = &mut *roles;

        let existing = table
            .by_id
            .get_mut(&role.id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Role, role.id))?;

        if existing.name != role.name {
            if let Some(holder) = table.by_name.get(&role.name) {
                if *holder != role.id {
                    return Err(StoreError::already_exists(EntityKind::Role, &role.name));
                }
            }
            table.by_name.remove(&existing.name);
            table.by_name.insert(role.name.clone(), role.id);
        }

        role.created_at = existing.created_at;
        *existing = role.clone();
        Ok(role)
    }

    fn remove_role(&self, id: &RoleId) -> Result<Role, StoreError> {
        let mut roles = self.roles_write()?;
        let mut user_roles = self.user_roles_write()?;
        let mut role_permissions = self.role_permissions_write()?;

        let role = roles
            .by_id
            .remove(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Role, id))?;
        roles.by_name.remove(&role.name);
        user_roles.remove_right(id);
        role_permissions.remove_left(id);

        Ok(role)
    }

    fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        let roles = self.roles_read()?;
        let mut list: Vec<Role> = roles.by_id.values().cloned().collect();
        list.sort_by(|a, b| a.natural_key().cmp(b.natural_key()));
        Ok(list)
    }

    fn insert_permission(&self, permission: Permission) -> Result<Permission, StoreError> {
        let mut permissions = write(&self.permissions, "permissions")?;
        if permissions.contains_key(permission.id()) {
            return Err(StoreError::already_exists(
                EntityKind::Permission,
                &permission.name,
            ));
        }
        permissions.insert(permission.name.clone(), permission.clone());
        Ok(permission)
    }

    fn get_permission(&self, name: &PermissionName) -> Result<Option<Permission>, StoreError> {
        let permissions = self.permissions_read()?;
        Ok(permissions.get(name).cloned())
    }

    fn list_permissions(&self) -> Result<Vec<Permission>, StoreError> {
        let permissions = self.permissions_read()?;
        let mut list: Vec<Permission> = permissions.values().cloned().collect();
        list.sort_by(|a, b| a.natural_key().cmp(b.natural_key()));
        Ok(list)
    }

    fn link_user_role(&self, user_id: &UserId, role_id: &RoleId) -> Result<bool, StoreError> {
        let users = self.users_read()?;
        let roles = self.roles_read()?;
        let mut user_roles = self.user_roles_write()?;

        if !users.by_id.contains_key(user_id) {
            return Err(StoreError::not_found(EntityKind::User, user_id));
        }
        if !roles.by_id.contains_key(role_id) {
            return Err(StoreError::not_found(EntityKind::Role, role_id));
        }

        Ok(user_roles.insert(*user_id, *role_id))
    }

    fn unlink_user_role(&self, user_id: &UserId, role_id: &RoleId) -> Result<bool, StoreError> {
        let mut user_roles = self.user_roles_write()?;
        Ok(user_roles.remove(user_id, role_id))
    }

    fn has_user_role(&self, user_id: &UserId, role_id: &RoleId) -> Result<bool, StoreError> {
        let user_roles = self.user_roles_read()?;
        Ok(user_roles.contains(user_id, role_id))
    }

    fn roles_of_user(&self, user_id: &UserId) -> Result<Vec<Role>, StoreError> {
        let users = self.users_read()?;
        let roles = self.roles_read()?;
        let user_roles = self.user_roles_read()?;

        if !users.by_id.contains_key(user_id) {
            return Err(StoreError::not_found(EntityKind::User, user_id));
        }

        let mut held: Vec<Role> = user_roles
            .right_of(user_id)
            .filter_map(|role_id| roles.by_id.get(role_id).cloned())
            .collect();
        held.sort_by(|a, b| a.natural_key().cmp(b.natural_key()));
        Ok(held)
    }

    fn users_of_role(&self, role_id: &RoleId) -> Result<Vec<User>, StoreError> {
        let users = self.users_read()?;
        let roles = self.roles_read()?;
        let user_roles = self.user_roles_read()?;

        if !roles.by_id.contains_key(role_id) {
            return Err(StoreError::not_found(EntityKind::Role, role_id));
        }

        let mut holders: Vec<User> = user_roles
            .left_of(role_id)
            .filter_map(|user_id| users.by_id.get(user_id).map(|row| row.user.clone()))
            .collect();
        holders.sort_by(|a, b| a.natural_key().cmp(b.natural_key()));
        Ok(holders)
    }

    fn link_role_permission(
        &self,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> Result<bool, StoreError> {
        let roles = self.roles_read()?;
        let permissions = self.permissions_read()?;
        let mut role_permissions = self.role_permissions_write()?;

        if !roles.by_id.contains_key(role_id) {
            return Err(StoreError::not_found(EntityKind::Role, role_id));
        }
        if !permissions.contains_key(permission) {
            return Err(StoreError::not_found(EntityKind::Permission, permission));
        }

        Ok(role_permissions.insert(*role_id, permission.clone()))
    }

    fn unlink_role_permission(
        &self,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> Result<bool, StoreError> {
        let mut role_permissions = self.role_permissions_write()?;
        Ok(role_permissions.remove(role_id, permission))
    }

    fn has_role_permission(
        &self,
        role_id: &RoleId,
        permission: &PermissionName,
    ) -> Result<bool, StoreError> {
        let role_permissions = self.role_permissions_read()?;
        Ok(role_permissions.contains(role_id, permission))
    }

    fn permissions_of_role(&self, role_id: &RoleId) -> Result<Vec<Permission>, StoreError> {
        let roles = self.roles_read()?;
        let permissions = self.permissions_read()?;
        let role_permissions = self.role_permissions_read()?;

        if !roles.by_id.contains_key(role_id) {
            return Err(StoreError::not_found(EntityKind::Role, role_id));
        }

        // BTreeSet iteration already yields names in order.
        Ok(role_permissions
            .right_of(role_id)
            .filter_map(|name| permissions.get(name).cloned())
            .collect())
    }

    fn roles_of_permission(&self, permission: &PermissionName) -> Result<Vec<Role>, StoreError> {
        let roles = self.roles_read()?;
        let permissions = self.permissions_read()?;
        let role_permissions = self.role_permissions_read()?;

        if !permissions.contains_key(permission) {
            return Err(StoreError::not_found(EntityKind::Permission, permission));
        }

        let mut holders: Vec<Role> = role_permissions
            .left_of(permission)
            .filter_map(|role_id| roles.by_id.get(role_id).cloned())
            .collect();
        holders.sort_by(|a, b| a.natural_key().cmp(b.natural_key()));
        Ok(holders)
    }

    fn user_grants(
        &self,
        user_id: &UserId,
    ) -> Result<(User, Vec<RoleWithPermissions>), StoreError> {
        let users = self.users_read()?;
        let roles = self.roles_read()?;
        let user_roles = self.user_roles_read()?;
        let role_permissions = self.role_permissions_read()?;

        let user = users
            .by_id
            .get(user_id)
            .map(|row| row.user.clone())
            .ok_or_else(|| StoreError::not_found(EntityKind::User, user_id))?;

        let mut grants: Vec<RoleWithPermissions> = user_roles
            .right_of(user_id)
            .filter_map(|role_id| roles.by_id.get(role_id))
            .map(|role| {
                let perms = role_permissions.right_of(&role.id).cloned().collect();
                (role.clone(), perms)
            })
            .collect();
        grants.sort_by(|a, b| a.0.natural_key().cmp(b.0.natural_key()));

        Ok((user, grants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_auth::{NewPermission, NewRole, NewUser};

    fn user(name: &str) -> User {
        User::from_new(NewUser::new(name), Utc::now())
    }

    fn role(name: &str) -> Role {
        Role::from_new(NewRole::new(name), Utc::now())
    }

    fn perm(name: &str) -> Permission {
        NewPermission::new(name.to_string()).into_permission().unwrap()
    }

    fn hash() -> CredentialHash {
        CredentialHash::new("$test$hash")
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = InMemoryEntityStore::new();
        store.insert_user(user("alice"), hash()).unwrap();
        let err = store.insert_user(user("alice"), hash()).unwrap_err();
        assert_eq!(err, StoreError::already_exists(EntityKind::User, "alice"));
    }

    #[test]
    fn reused_id_is_rejected_under_a_new_key() {
        let store = InMemoryEntityStore::new();
        let alice = store.insert_user(user("alice"), hash()).unwrap();
        let mut twin = user("bob");
        twin.id = alice.id;
        let err = store.insert_user(twin, hash()).unwrap_err();
        assert_eq!(err, StoreError::already_exists(EntityKind::User, alice.id));

        let admin = store.insert_role(role("admin")).unwrap();
        let mut twin = role("ops");
        twin.id = admin.id;
        assert!(matches!(
            store.insert_role(twin),
            Err(StoreError::AlreadyExists { .. })
        ));
        assert!(store.find_user_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn rename_reindexes_username() {
        let store = InMemoryEntityStore::new();
        let mut alice = store.insert_user(user("alice"), hash()).unwrap();
        store.insert_user(user("bob"), hash()).unwrap();

        alice.username = "bob".to_string();
        assert!(matches!(
            store.replace_user(alice.clone()),
            Err(StoreError::AlreadyExists { .. })
        ));

        alice.username = "alicia".to_string();
        store.replace_user(alice.clone()).unwrap();
        assert!(store.find_user_by_username("alice").unwrap().is_none());
        assert_eq!(store.find_user_by_username("alicia").unwrap().unwrap().id, alice.id);
    }

    #[test]
    fn replace_keeps_created_at() {
        let store = InMemoryEntityStore::new();
        let original = store.insert_user(user("alice"), hash()).unwrap();

        let mut changed = original.clone();
        changed.created_at = Utc::now() + chrono::Duration::days(1);
        let stored = store.replace_user(changed).unwrap();
        assert_eq!(stored.created_at, original.created_at);
    }

    #[test]
    fn link_requires_both_ends() {
        let store = InMemoryEntityStore::new();
        let alice = store.insert_user(user("alice"), hash()).unwrap();
        let admin = store.insert_role(role("admin")).unwrap();

        let err = store.link_user_role(&UserId::new(), &admin.id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: EntityKind::User, .. }));

        let err = store.link_user_role(&alice.id, &RoleId::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: EntityKind::Role, .. }));

        assert!(store.link_user_role(&alice.id, &admin.id).unwrap());
        assert!(!store.link_user_role(&alice.id, &admin.id).unwrap());
    }

    #[test]
    fn removing_role_cascades_to_both_relations() {
        let store = InMemoryEntityStore::new();
        let alice = store.insert_user(user("alice"), hash()).unwrap();
        let admin = store.insert_role(role("admin")).unwrap();
        store.insert_permission(perm("users.read")).unwrap();
        let read = PermissionName::from("users.read");

        store.link_user_role(&alice.id, &admin.id).unwrap();
        store.link_role_permission(&admin.id, &read).unwrap();

        store.remove_role(&admin.id).unwrap();

        assert!(store.roles_of_user(&alice.id).unwrap().is_empty());
        assert!(!store.has_role_permission(&admin.id, &read).unwrap());
        assert!(store.roles_of_permission(&read).unwrap().is_empty());
    }

    #[test]
    fn removing_user_cascades_to_user_roles() {
        let store = InMemoryEntityStore::new();
        let alice = store.insert_user(user("alice"), hash()).unwrap();
        let admin = store.insert_role(role("admin")).unwrap();
        store.link_user_role(&alice.id, &admin.id).unwrap();

        store.remove_user(&alice.id).unwrap();

        assert!(store.users_of_role(&admin.id).unwrap().is_empty());
        assert!(!store.has_user_role(&alice.id, &admin.id).unwrap());
        assert!(store.find_user_by_username("alice").unwrap().is_none());
    }

    #[test]
    fn user_grants_collects_role_permissions() {
        let store = InMemoryEntityStore::new();
        let alice = store.insert_user(user("alice"), hash()).unwrap();
        let viewer = store.insert_role(role("viewer")).unwrap();
        store.insert_permission(perm("users.read")).unwrap();
        store
            .link_role_permission(&viewer.id, &PermissionName::from("users.read"))
            .unwrap();
        store.link_user_role(&alice.id, &viewer.id).unwrap();

        let (resolved, grants) = store.user_grants(&alice.id).unwrap();
        assert_eq!(resolved.id, alice.id);
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].0.name, "viewer");
        assert_eq!(grants[0].1, vec![PermissionName::from("users.read")]);
    }

    #[test]
    fn credential_update_stamps_updated_at() {
        let store = InMemoryEntityStore::new();
        let alice = store.insert_user(user("alice"), hash()).unwrap();
        let later = alice.updated_at + chrono::Duration::seconds(5);

        store
            .set_user_credential(&alice.id, CredentialHash::new("$new$hash"), later)
            .unwrap();

        assert_eq!(store.user_credential(&alice.id).unwrap().unwrap().as_str(), "$new$hash");
        assert_eq!(store.get_user(&alice.id).unwrap().unwrap().updated_at, later);
    }
}
