//! Input normalization and validation.
//!
//! Everything here runs before storage is touched; failures are
//! `DomainError::Validation`.

use warden_core::{DomainError, DomainResult};

pub const MAX_NAME_LEN: usize = 64;

/// Trim and check a username: 1..=64 chars, no whitespace.
pub fn username(raw: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation("username cannot be empty"));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "username exceeds {MAX_NAME_LEN} characters"
        )));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("username cannot contain whitespace"));
    }
    Ok(value.to_string())
}

/// Email is optional; when present it needs a non-empty local part and domain.
pub fn email(raw: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    match value.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(value.to_string())
        }
        _ => Err(DomainError::validation("invalid email format")),
    }
}

pub fn password(raw: &str) -> DomainResult<()> {
    if raw.is_empty() {
        return Err(DomainError::validation("password cannot be empty"));
    }
    Ok(())
}

/// Trim and check a role name: 1..=64 chars.
pub fn role_name(raw: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation("role name cannot be empty"));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "role name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trim and check a permission name: non-empty, no whitespace.
pub fn permission_name(raw: &str) -> DomainResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::validation("permission name cannot be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(DomainError::validation(
            "permission name cannot contain whitespace",
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_trimmed() {
        assert_eq!(username("  alice ").unwrap(), "alice");
    }

    #[test]
    fn username_rejects_blank_and_inner_whitespace() {
        assert!(username("   ").is_err());
        assert!(username("al ice").is_err());
        assert!(username(&"a".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn email_is_optional_but_checked() {
        assert_eq!(email("").unwrap(), "");
        assert_eq!(email(" alice@example.com ").unwrap(), "alice@example.com");
        assert!(email("alice").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("a@b@c").is_err());
    }

    #[test]
    fn permission_name_rejects_whitespace() {
        assert_eq!(permission_name(" users.read ").unwrap(), "users.read");
        assert!(permission_name("users read").is_err());
        assert!(permission_name("").is_err());
    }
}
