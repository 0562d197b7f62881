//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// The kind of record an error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Role,
    Permission,
    UserRole,
    RolePermission,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Role => "role",
            EntityKind::Permission => "permission",
            EntityKind::UserRole => "user role",
            EntityKind::RolePermission => "role permission",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, uniqueness, missing
/// references, cancellation). Each variant collapses into exactly one
/// [`ErrorKind`], which is what callers should branch on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A referenced record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: EntityKind, key: String },

    /// A natural key (or identifier) is already bound to a different record.
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: EntityKind, key: String },

    /// Authentication failed. Deliberately carries no detail.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The caller cancelled the request before the operation started.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline had already passed when the operation started.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Storage failure that is not a domain outcome (e.g. a poisoned lock).
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: EntityKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn already_exists(entity: EntityKind, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The caller-facing kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            DomainError::InvalidCredentials => ErrorKind::InvalidCredentials,
            DomainError::Validation(_) | DomainError::InvalidId(_) => ErrorKind::InvalidArgument,
            DomainError::Cancelled | DomainError::DeadlineExceeded => ErrorKind::Cancelled,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Which record kind a `NotFound`/`AlreadyExists` refers to.
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            DomainError::NotFound { entity, .. } | DomainError::AlreadyExists { entity, .. } => {
                Some(*entity)
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self, entity: EntityKind) -> bool {
        matches!(self, DomainError::NotFound { entity: e, .. } if *e == entity)
    }
}

/// Caller-facing error kinds.
///
/// Transport adapters map these to status codes; they never need to inspect
/// message text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidCredentials,
    InvalidArgument,
    Cancelled,
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists => 409,
            ErrorKind::InvalidCredentials => 401,
            ErrorKind::InvalidArgument => 400,
            ErrorKind::Cancelled => 499,
            ErrorKind::Internal => 500,
        }
    }

    /// gRPC status code name for this kind.
    pub fn grpc_code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::InvalidCredentials => "UNAUTHENTICATED",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}
