//! Seed data for a fresh store.
//!
//! Bootstrap goes through the usecase like any other caller. Every step
//! tolerates records that already exist, so running it again is a no-op.

use serde::Serialize;
use tracing::info;

use warden_auth::{NewPermission, NewRole, NewUser, PermissionName};
use warden_core::{DomainError, DomainResult, EntityKind, RequestContext, UserId};
use warden_infra::EntityStore;

use crate::config::SeedConfig;
use crate::usecase::AuthorizationUsecase;

/// Default permission set: read/write for each managed resource plus `*`.
pub const DEFAULT_PERMISSIONS: &[&str] = &[
    "users.read",
    "users.write",
    "roles.read",
    "roles.write",
    "permissions.read",
    "permissions.write",
    PermissionName::WILDCARD,
];

pub const DEFAULT_ROLES: &[&str] = &["admin", "manager", "viewer"];

/// Default role-to-permission mapping.
pub fn default_role_permissions(role: &str) -> Vec<&'static str> {
    match role {
        "admin" => vec![PermissionName::WILDCARD],
        "manager" => vec![
            "users.read",
            "users.write",
            "roles.read",
            "permissions.read",
        ],
        "viewer" => vec!["users.read", "roles.read", "permissions.read"],
        _ => vec![],
    }
}

fn role_description(role: &str) -> &'static str {
    match role {
        "admin" => "Full administrator with all permissions",
        "manager" => "Manages users and reads the role catalogue",
        "viewer" => "Read-only access to users, roles and permissions",
        _ => "",
    }
}

fn permission_description(name: &str) -> String {
    if name == PermissionName::WILDCARD {
        return "Wildcard permission - grants all permissions".to_string();
    }
    match name.rsplit_once('.') {
        Some((resource, "read")) => format!("Read {resource}"),
        Some((resource, "write")) => format!("Create, update and delete {resource}"),
        _ => String::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plan
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRole {
    pub name: String,
    pub description: String,
    pub permissions: Vec<PermissionName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    pub permissions: Vec<NewPermission>,
    pub roles: Vec<SeedRole>,
    pub admin: Option<SeedAdmin>,
}

impl SeedPlan {
    /// Default permissions and roles, without an admin user.
    pub fn standard() -> Self {
        let permissions = DEFAULT_PERMISSIONS
            .iter()
            .map(|name| NewPermission::new(*name).with_description(permission_description(name)))
            .collect();

        let roles = DEFAULT_ROLES
            .iter()
            .map(|role| SeedRole {
                name: role.to_string(),
                description: role_description(role).to_string(),
                permissions: default_role_permissions(role)
                    .into_iter()
                    .map(PermissionName::from)
                    .collect(),
            })
            .collect();

        Self {
            permissions,
            roles,
            admin: None,
        }
    }

    /// The standard plan plus an admin user when a password is configured.
    pub fn from_config(config: &SeedConfig) -> Self {
        let mut plan = Self::standard();
        plan.admin = config.admin_password.as_ref().map(|password| SeedAdmin {
            username: config.admin_username.clone(),
            email: config.admin_email.clone(),
            password: password.clone(),
            role: "admin".to_string(),
        });
        plan
    }
}

/// What a bootstrap run actually created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub permissions_created: usize,
    pub roles_created: usize,
    pub grants_created: usize,
    pub admin_user: Option<UserId>,
    pub admin_created: bool,
    pub admin_role_assigned: bool,
}

impl BootstrapReport {
    pub fn is_noop(&self) -> bool {
        self.permissions_created == 0
            && self.roles_created == 0
            && self.grants_created == 0
            && !self.admin_created
            && !self.admin_role_assigned
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Execution
// ─────────────────────────────────────────────────────────────────────────────

/// Apply `plan` against the usecase's store.
///
/// An existing admin user keeps its password; only the role assignment is
/// ensured.
pub fn bootstrap<S>(
    usecase: &AuthorizationUsecase<S>,
    ctx: &RequestContext,
    plan: &SeedPlan,
) -> DomainResult<BootstrapReport>
where
    S: EntityStore + ?Sized,
{
    let mut report = BootstrapReport::default();

    for permission in &plan.permissions {
        match usecase.create_permission(ctx, permission.clone()) {
            Ok(_) => report.permissions_created += 1,
            Err(DomainError::AlreadyExists { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    for seed in &plan.roles {
        let role = match usecase.create_role(
            ctx,
            NewRole::new(seed.name.clone()).with_description(seed.description.clone()),
        ) {
            Ok(role) => {
                report.roles_created += 1;
                role
            }
            Err(DomainError::AlreadyExists { .. }) => usecase.get_role_by_name(ctx, &seed.name)?,
            Err(e) => return Err(e),
        };

        for permission in &seed.permissions {
            if usecase.add_permission_to_role(ctx, &role.id, permission)? {
                report.grants_created += 1;
            }
        }
    }

    if let Some(admin) = &plan.admin {
        let user = match usecase.create_user(
            ctx,
            NewUser::new(admin.username.clone()).with_email(admin.email.clone()),
            &admin.password,
        ) {
            Ok(user) => {
                report.admin_created = true;
                user
            }
            Err(DomainError::AlreadyExists { entity: EntityKind::User, .. }) => {
                usecase.get_user_by_username(ctx, &admin.username)?
            }
            Err(e) => return Err(e),
        };

        let role = usecase.get_role_by_name(ctx, &admin.role)?;
        report.admin_role_assigned = usecase.assign_role_to_user(ctx, &user.id, &role.id)?;
        report.admin_user = Some(user.id);
    }

    info!(
        permissions = report.permissions_created,
        roles = report.roles_created,
        grants = report.grants_created,
        admin_created = report.admin_created,
        "bootstrap finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_grant_names_a_default_permission() {
        for role in DEFAULT_ROLES {
            for permission in default_role_permissions(role) {
                assert!(
                    DEFAULT_PERMISSIONS.contains(&permission),
                    "{role} grants unknown permission {permission}"
                );
            }
        }
    }

    #[test]
    fn admin_holds_wildcard() {
        let plan = SeedPlan::standard();
        let admin = plan.roles.iter().find(|r| r.name == "admin").unwrap();
        assert_eq!(admin.permissions, vec![PermissionName::from("*")]);
        assert!(!admin.description.is_empty());
    }

    #[test]
    fn admin_user_only_with_password() {
        let mut config = SeedConfig::default();
        assert!(SeedPlan::from_config(&config).admin.is_none());

        config.admin_password = Some("pw".to_string());
        let admin = SeedPlan::from_config(&config).admin.unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.role, "admin");
    }

    #[test]
    fn permission_descriptions() {
        assert_eq!(permission_description("users.read"), "Read users");
        assert!(permission_description("*").starts_with("Wildcard"));
    }
}
