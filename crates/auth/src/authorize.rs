use serde::Serialize;
use thiserror::Error;

use crate::{PermissionName, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("principal is inactive")]
    Inactive,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal for a single permission.
///
/// - No IO
/// - No panics
/// - Grants on an exact name match or on the wildcard `*`
pub fn authorize(principal: &Principal, required: &PermissionName) -> Result<(), AuthzError> {
    if !principal.active {
        return Err(AuthzError::Inactive);
    }

    let perms = principal.effective_permissions();
    if perms.iter().any(|p| p.is_wildcard() || *p == required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a request was (or would be) allowed or denied.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    /// Roles held by the principal that grant the permission (directly or via `*`).
    pub granting_roles: Vec<String>,
    pub effective_permissions: Vec<String>,
}

pub fn explain_authorization(
    principal: &Principal,
    required: &PermissionName,
) -> AuthorizationExplanation {
    let required_str = required.as_str();
    let effective_permissions: Vec<String> = principal
        .effective_permissions()
        .into_iter()
        .map(|p| p.as_str().to_string())
        .collect();

    // An inactive principal holds roles but is granted nothing through them.
    let granting_roles: Vec<String> = principal
        .roles
        .iter()
        .filter(|_| principal.active)
        .filter(|grant| {
            grant
                .permissions
                .iter()
                .any(|p| p.is_wildcard() || p == required)
        })
        .map(|grant| grant.name.clone())
        .collect();

    let (granted, reason) = match authorize(principal, required) {
        Ok(())
            if principal.has_wildcard()
                && !effective_permissions.iter().any(|p| p == required_str) =>
        {
            (
                true,
                format!("granted by wildcard permission via roles {granting_roles:?}"),
            )
        }
        Ok(()) => (
            true,
            format!("permission '{required_str}' granted via roles {granting_roles:?}"),
        ),
        Err(AuthzError::Inactive) => (false, "principal is inactive".to_string()),
        Err(AuthzError::Forbidden(_)) => (
            false,
            format!(
                "no role held by '{}' grants '{required_str}' (roles: {:?})",
                principal.username,
                principal.role_names()
            ),
        ),
    };

    AuthorizationExplanation {
        required_permission: required_str.to_string(),
        granted,
        reason,
        granting_roles,
        effective_permissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoleGrant;
    use warden_core::{RoleId, UserId};

    fn principal(active: bool, grants: Vec<(&str, Vec<&'static str>)>) -> Principal {
        Principal {
            user_id: UserId::new(),
            username: "alice".to_string(),
            active,
            roles: grants
                .into_iter()
                .map(|(name, perms)| RoleGrant {
                    role_id: RoleId::new(),
                    name: name.to_string(),
                    permissions: perms.into_iter().map(PermissionName::from).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn exact_permission_is_granted() {
        let p = principal(true, vec![("viewer", vec!["users.read"])]);
        assert!(authorize(&p, &PermissionName::from("users.read")).is_ok());
        assert_eq!(
            authorize(&p, &PermissionName::from("users.write")),
            Err(AuthzError::Forbidden("users.write".to_string()))
        );
    }

    #[test]
    fn wildcard_grants_everything() {
        let p = principal(true, vec![("admin", vec!["*"])]);
        assert!(authorize(&p, &PermissionName::from("anything.at_all")).is_ok());
    }

    #[test]
    fn inactive_principal_is_denied_even_with_wildcard() {
        let p = principal(false, vec![("admin", vec!["*"])]);
        assert_eq!(
            authorize(&p, &PermissionName::from("users.read")),
            Err(AuthzError::Inactive)
        );
        assert!(p.effective_permissions().is_empty());
    }

    #[test]
    fn explanation_names_granting_roles() {
        let p = principal(
            true,
            vec![("viewer", vec!["users.read"]), ("ops", vec!["roles.read"])],
        );
        let explanation = explain_authorization(&p, &PermissionName::from("users.read"));
        assert!(explanation.granted);
        assert_eq!(explanation.granting_roles, vec!["viewer".to_string()]);

        let denied = explain_authorization(&p, &PermissionName::from("users.write"));
        assert!(!denied.granted);
        assert!(denied.granting_roles.is_empty());
        assert!(denied.reason.contains("users.write"));
    }

    #[test]
    fn inactive_explanation_names_no_granting_roles() {
        let p = principal(false, vec![("admin", vec!["*"]), ("viewer", vec!["users.read"])]);
        let explanation = explain_authorization(&p, &PermissionName::from("users.read"));
        assert!(!explanation.granted);
        assert!(explanation.granting_roles.is_empty());
        assert!(explanation.effective_permissions.is_empty());
        assert_eq!(explanation.reason, "principal is inactive");
    }
}
