//! Pluggable password hashing.
//!
//! The usecase only ever sees [`CredentialHasher`]; raw passwords are never
//! stored or compared directly.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use warden_core::{DomainError, DomainResult};

/// Opaque, encoded password hash (PHC string format for the default hasher).
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// Credential-hashing capability injected into the usecase.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> DomainResult<CredentialHash>;

    /// `false` for a wrong password and for an unparseable hash alike.
    fn verify(&self, password: &str, hash: &CredentialHash) -> bool;
}

impl<H> CredentialHasher for Arc<H>
where
    H: CredentialHasher + ?Sized,
{
    fn hash(&self, password: &str) -> DomainResult<CredentialHash> {
        (**self).hash(password)
    }

    fn verify(&self, password: &str, hash: &CredentialHash) -> bool {
        (**self).verify(password, hash)
    }
}

/// Argon2id hasher with an optional pepper passed as the Argon2 secret.
#[derive(Clone)]
pub struct Argon2Hasher {
    pepper: Vec<u8>,
    params: Params,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self {
            pepper: Vec::new(),
            params: Params::default(),
        }
    }

    /// Custom cost parameters (memory in KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> DomainResult<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| DomainError::validation(format!("invalid argon2 params: {e}")))?;
        Ok(Self {
            pepper: Vec::new(),
            params,
        })
    }

    pub fn with_pepper(mut self, pepper: impl Into<Vec<u8>>) -> Self {
        self.pepper = pepper.into();
        self
    }

    fn argon2(&self) -> Result<Argon2<'_>, argon2::Error> {
        if self.pepper.is_empty() {
            Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            ))
        } else {
            Argon2::new_with_secret(
                &self.pepper,
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("peppered", &!self.pepper.is_empty())
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> DomainResult<CredentialHash> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self
            .argon2()
            .map_err(|e| DomainError::internal(format!("argon2 setup failed: {e}")))?;
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))?;
        Ok(CredentialHash(hash.to_string()))
    }

    fn verify(&self, password: &str, hash: &CredentialHash) -> bool {
        let Ok(parsed) = PasswordHash::new(hash.as_str()) else {
            return false;
        };
        let Ok(argon2) = self.argon2() else {
            return false;
        };
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}
