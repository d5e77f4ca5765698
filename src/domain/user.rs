//! User domain entity and its client-facing projection.

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Argon2 hash of the registered biometric key, if any
    #[serde(skip_serializing)]
    pub biometric_key_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a password hash and no biometric key
    pub fn new(id: Uuid, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            biometric_key_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a biometric key has been registered for this user
    pub fn has_biometric_key(&self) -> bool {
        self.biometric_key_hash.is_some()
    }
}

/// User response (safe to return to client). Hashes never leave the service.
#[derive(Debug, Clone, Serialize, SimpleObject, ToSchema)]
#[graphql(name = "User")]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Whether biometric login is enabled
    pub biometric_enabled: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            biometric_enabled: user.has_biometric_key(),
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
