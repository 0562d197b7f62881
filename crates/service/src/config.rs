//! Runtime configuration read from `WARDEN_*` environment variables.
//!
//! Unset variables fall back to defaults; malformed values are logged and
//! ignored.

use serde::Deserialize;

use warden_auth::Argon2Hasher;
use warden_infra::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageLimits};
use warden_observability::LogConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub pagination: PaginationConfig,
    pub seed: SeedConfig,
    pub credentials: CredentialConfig,
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Used when a request asks for page size `0`.
    pub default_page_size: u32,
    /// Larger requests are clamped to this.
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PaginationConfig {
    pub fn limits(&self) -> PageLimits {
        PageLimits::new(self.default_page_size, self.max_page_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub admin_username: String,
    /// No admin user is seeded without a password.
    pub admin_password: Option<String>,
    pub admin_email: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: None,
            admin_email: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Server-side secret mixed into every password hash.
    pub pepper: Option<String>,
}

impl CredentialConfig {
    pub fn hasher(&self) -> Argon2Hasher {
        match self.pepper.as_deref() {
            Some(pepper) if !pepper.is_empty() => {
                Argon2Hasher::new().with_pepper(pepper.as_bytes())
            }
            _ => Argon2Hasher::new(),
        }
    }
}

impl WardenConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key: &str| std::env::var(key).ok())
    }

    /// Logging settings only, for initializing tracing before the rest of the
    /// configuration is read.
    pub fn logging_from_env() -> LogConfig {
        logging_from(&|key: &str| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let pagination = PaginationConfig {
            default_page_size: parsed(&lookup, "WARDEN_DEFAULT_PAGE_SIZE")
                .unwrap_or(defaults.pagination.default_page_size),
            max_page_size: parsed(&lookup, "WARDEN_MAX_PAGE_SIZE")
                .unwrap_or(defaults.pagination.max_page_size),
        };

        let seed = SeedConfig {
            admin_username: lookup("WARDEN_ADMIN_USERNAME")
                .unwrap_or_else(|| defaults.seed.admin_username.clone()),
            admin_password: lookup("WARDEN_ADMIN_PASSWORD").filter(|p| !p.is_empty()),
            admin_email: lookup("WARDEN_ADMIN_EMAIL").unwrap_or_default(),
        };

        if seed.admin_password.is_none() {
            tracing::warn!("WARDEN_ADMIN_PASSWORD not set; no admin user will be seeded");
        }

        let credentials = CredentialConfig {
            pepper: lookup("WARDEN_PASSWORD_PEPPER").filter(|p| !p.is_empty()),
        };

        Self {
            pagination,
            seed,
            credentials,
            logging: logging_from(&lookup),
        }
    }
}

fn logging_from(lookup: &impl Fn(&str) -> Option<String>) -> LogConfig {
    let defaults = LogConfig::default();
    LogConfig {
        filter: lookup("WARDEN_LOG_FILTER").unwrap_or(defaults.filter),
        json: parsed(lookup, "WARDEN_LOG_JSON").unwrap_or(defaults.json),
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring malformed configuration value");
            None
        }
    }
}
