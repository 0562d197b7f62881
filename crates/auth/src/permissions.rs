use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use warden_core::{DomainResult, Entity};

use crate::validate;

/// Permission identifier.
///
/// Permissions are named by opaque strings (e.g. "users.read"), and the name
/// doubles as the primary key. The special wildcard `"*"` grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionName(Cow<'static, str>);

impl PermissionName {
    pub const WILDCARD: &'static str = "*";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == Self::WILDCARD
    }

    /// Split a dotted name into `(resource, action)`.
    ///
    /// `"admin.users.read"` yields `("admin.users", "read")`; names without a
    /// dot yield `None`.
    pub fn split_resource_action(&self) -> Option<(&str, &str)> {
        self.as_str().rsplit_once('.')
    }
}

impl core::fmt::Display for PermissionName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for PermissionName {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PermissionName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A permission record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub name: PermissionName,
    pub description: String,
    pub resource_type: String,
    pub action: String,
}

impl Permission {
    /// Exact-match filter over the name or the resource type.
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter.is_empty() || self.name.as_str() == filter || self.resource_type == filter
    }
}

impl Entity for Permission {
    type Id = PermissionName;

    fn id(&self) -> &Self::Id {
        &self.name
    }

    fn natural_key(&self) -> &str {
        self.name.as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPermission {
    pub name: String,
    pub description: String,
    pub resource_type: String,
    pub action: String,
}

impl NewPermission {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_resource_action(
        mut self,
        resource_type: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.resource_type = resource_type.into();
        self.action = action.into();
        self
    }

    /// Validate and build the record.
    ///
    /// When neither resource type nor action is given they are derived from a
    /// dotted name.
    pub fn into_permission(self) -> DomainResult<Permission> {
        let name = PermissionName::new(validate::permission_name(&self.name)?);
        let mut resource_type = self.resource_type.trim().to_string();
        let mut action = self.action.trim().to_string();

        if resource_type.is_empty() && action.is_empty() {
            if let Some((resource, act)) = name.split_resource_action() {
                resource_type = resource.to_string();
                action = act.to_string();
            }
        }

        Ok(Permission {
            name,
            description: self.description.trim().to_string(),
            resource_type,
            action,
        })
    }
}
