//! One-way hashing for passwords and biometric keys.
//!
//! Argon2id with a per-call random salt. Hashing is CPU bound, so both
//! hashing and verification run on the blocking pool instead of the
//! async workers.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use thiserror::Error;

use crate::config::HashSettings;

/// Hashing failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    #[error("cannot hash an empty secret")]
    EmptySecret,

    #[error("hashing failed: {0}")]
    Primitive(String),
}

/// Salted one-way hashing and comparison of secrets.
///
/// `compare` never fails: an absent hash, a malformed hash and a wrong
/// secret all read as `false`.
#[async_trait]
pub trait SecretHasher: Send + Sync {
    async fn hash(&self, secret: &str) -> Result<String, HashError>;

    async fn compare(&self, secret: &str, hash: Option<&str>) -> bool;

    /// A well-formed hash of an unknown secret at this hasher's cost.
    /// Verifying against it costs the same as verifying a real hash.
    fn dummy_hash(&self) -> &str;
}

/// Argon2id implementation of [`SecretHasher`]
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    dummy: String,
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl Argon2Hasher {
    /// Build a hasher with explicit cost parameters.
    ///
    /// # Errors
    /// Returns `HashError::Primitive` if argon2 rejects the parameters.
    pub fn new(settings: HashSettings) -> Result<Self, HashError> {
        let params = Params::new(
            settings.memory_kib,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(|e| HashError::Primitive(e.to_string()))?;

        // Built once at startup; the secret is discarded.
        let throwaway = SaltString::generate(&mut OsRng);
        let dummy = Self::argon2(params.clone())
            .hash_password(throwaway.as_str().as_bytes(), &SaltString::generate(&mut OsRng))
            .map_err(|e| HashError::Primitive(e.to_string()))?
            .to_string();

        Ok(Self { params, dummy })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

#[async_trait]
impl SecretHasher for Argon2Hasher {
    async fn hash(&self, secret: &str) -> Result<String, HashError> {
        if secret.is_empty() {
            return Err(HashError::EmptySecret);
        }

        let secret = secret.to_owned();
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(secret.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| HashError::Primitive(e.to_string()))
        })
        .await
        .map_err(|e| HashError::Primitive(e.to_string()))?
    }

    async fn compare(&self, secret: &str, hash: Option<&str>) -> bool {
        let Some(hash) = hash else {
            return false;
        };

        let secret = secret.to_owned();
        let hash = hash.to_owned();
        let params = self.params.clone();

        // Verification takes its cost from the PHC string, not from `params`.
        let outcome = tokio::task::spawn_blocking(move || match PasswordHash::new(&hash) {
            Ok(parsed) => Self::argon2(params)
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        })
        .await;

        match outcome {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!("Secret comparison task failed: {}", e);
                false
            }
        }
    }

    fn dummy_hash(&self) -> &str {
        &self.dummy
    }
}
