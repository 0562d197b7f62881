//! Record identifiers.
//!
//! Ids are UUIDv7, so freshly created records sort by creation time. Each id
//! type knows which [`EntityKind`] it names; a malformed id is reported
//! against that kind.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, EntityKind};

macro_rules! uuid_id {
    ($(#[$meta:meta])* pub struct $name:ident => $kind:expr;) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const KIND: EntityKind = $kind;

            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self.0.as_hyphenated(), f)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|e| {
                    DomainError::invalid_id(format!("malformed {} id '{s}': {e}", Self::KIND))
                })
            }
        }
    };
}

uuid_id! {
    /// Primary key of a user account. Stable across username changes.
    pub struct UserId => EntityKind::User;
}

uuid_id! {
    /// Primary key of a role. Stable across renames.
    pub struct RoleId => EntityKind::Role;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn parse_round_trips_display() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(format!(" {id} ").parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn malformed_id_names_its_entity() {
        let err = "not-a-uuid".parse::<RoleId>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("malformed role id 'not-a-uuid'"));
    }
}
