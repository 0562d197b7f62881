use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{DomainResult, Entity, RoleId};

use crate::validate;

/// A named bundle of permissions that can be assigned to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn from_new(new: NewRole, now: DateTime<Utc>) -> Self {
        Self {
            id: new.id.unwrap_or_default(),
            name: new.name,
            description: new.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: RoleChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
    }

    pub fn matches_filter(&self, filter: &str) -> bool {
        filter.is_empty() || self.name == filter
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn natural_key(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub id: Option<RoleId>,
    pub name: String,
    pub description: String,
}

impl NewRole {
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

    pub fn validated(self) -> DomainResult<Self> {
        Ok(Self {
            id: self.id,
            name: validate::role_name(&self.name)?,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl RoleChanges {
    pub fn validated(self) -> DomainResult<Self> {
        Ok(Self {
            name: self.name.as_deref().map(validate::role_name).transpose()?,
            description: self.description.map(|d| d.trim().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_keeps_identity() {
        let new = NewRole::new("admin").validated().unwrap();
        let mut role = Role::from_new(new, Utc::now());
        let id = role.id;
        role.apply(RoleChanges {
            name: Some("root".to_string()),
            description: None,
        });
        assert_eq!(role.id, id);
        assert_eq!(role.name, "root");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(NewRole::new("  ").validated().is_err());
    }
}
