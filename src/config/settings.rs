//! Application settings loaded from environment variables.

use std::env;

use chrono::Duration;
use thiserror::Error;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB,
    DEFAULT_HASH_PARALLELISM, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};

/// Longest accepted token lifetime (one year).
const MAX_EXPIRY_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Legacy variable name still honoured for the token lifetime.
const LEGACY_EXPIRY_KEY: &str = "jwtExpiresTime";

/// Startup configuration failures. The process must not bind a socket
/// when any of these is returned.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("JWT_SECRET must be at least {0} characters long")]
    SecretTooShort(usize),

    #[error("{0} environment variable has an invalid value")]
    Invalid(&'static str),

    #[error("invalid token expiry {0:?}: expected seconds or a number suffixed with s, m, h or d")]
    InvalidExpiry(String),
}

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            iterations: DEFAULT_HASH_ITERATIONS,
            parallelism: DEFAULT_HASH_PARALLELISM,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub server_host: String,
    pub server_port: u16,
    pub hash: HashSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expires_in", &self.jwt_expires_in.num_seconds())
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("hash", &self.hash)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment (and `.env`).
    ///
    /// # Errors
    /// Fails when the signing secret or the token lifetime is missing or
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort(MIN_JWT_SECRET_LENGTH));
        }

        let raw_expiry = lookup("JWT_EXPIRES_IN")
            .or_else(|| lookup(LEGACY_EXPIRY_KEY))
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_EXPIRES_IN"))?;
        let jwt_expires_in = parse_expiry(&raw_expiry)?;

        let defaults = HashSettings::default();
        let hash = HashSettings {
            memory_kib: parse_or(&lookup, "HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "HASH_ITERATIONS", defaults.iterations)?,
            parallelism: defaults.parallelism,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expires_in,
            server_host: lookup("SERVER_HOST")
                .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            hash,
        })
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Unset means the default; set but unparsable is an error.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
    }
}

/// Parse a token lifetime such as `3600`, `90s`, `15m`, `12h` or `7d`.
pub fn parse_expiry(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidExpiry(raw.to_string());
    let value = raw.trim();

    let (digits, unit) = match value.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&value[..idx], c.to_ascii_lowercase()),
        Some(_) => (value, 's'),
        None => return Err(invalid()),
    };

    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    let seconds = amount.checked_mul(multiplier).ok_or_else(invalid)?;
    if seconds <= 0 || seconds > MAX_EXPIRY_SECONDS {
        return Err(invalid());
    }

    Ok(Duration::seconds(seconds))
}
