//! `warden-auth`: identity and authorization domain model.
//!
//! This crate is intentionally decoupled from storage and transport.

pub mod authorize;
pub mod credentials;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;
pub mod validate;

pub use authorize::{AuthorizationExplanation, AuthzError, authorize, explain_authorization};
pub use credentials::{Argon2Hasher, CredentialHash, CredentialHasher};
pub use permissions::{NewPermission, Permission, PermissionName};
pub use principal::{Principal, RoleGrant};
pub use roles::{NewRole, Role, RoleChanges};
pub use user::{NewUser, User, UserChanges};
