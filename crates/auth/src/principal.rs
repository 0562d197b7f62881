use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use warden_core::{RoleId, UserId};

use crate::PermissionName;

/// A role held by a principal, together with the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role_id: RoleId,
    pub name: String,
    pub permissions: Vec<PermissionName>,
}

/// A fully resolved identity for authorization decisions.
///
/// Built by the usecase from the relation sets at request time; it is a
/// snapshot and is not kept in sync with later changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub active: bool,
    pub roles: Vec<RoleGrant>,
}

impl Principal {
    /// Union of all permissions granted through roles. Inactive principals
    /// have none.
    pub fn effective_permissions(&self) -> BTreeSet<&PermissionName> {
        if !self.active {
            return BTreeSet::new();
        }
        self.roles
            .iter()
            .flat_map(|grant| grant.permissions.iter())
            .collect()
    }

    pub fn has_wildcard(&self) -> bool {
        self.effective_permissions()
            .iter()
            .any(|p| p.is_wildcard())
    }

    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }
}
