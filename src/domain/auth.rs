//! Authentication request and response shapes.
//!
//! These types are shared by the GraphQL resolvers and the REST mirror,
//! so they carry both `async-graphql` and `utoipa` derives.

use async_graphql::{InputObject, SimpleObject};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::TOKEN_TYPE_BEARER;

/// Email and password submitted for registration or login.
///
/// Lives only for the duration of a request; never persisted.
#[derive(Clone, Deserialize, Validate, InputObject, ToSchema)]
#[graphql(name = "StandardLoginInput")]
pub struct Credential {
    /// User email address
    #[validate(email(message = "email must be an email"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Plaintext password (minimum 6 characters)
    #[validate(length(min = 6, message = "password must be longer than or equal to 6 characters"))]
    #[schema(example = "secret1", min_length = 6)]
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject, ToSchema)]
pub struct Authorization {
    /// Signed JWT
    #[graphql(name = "access_token")]
    pub access_token: String,
    /// Token scheme, always "Bearer"
    #[serde(rename = "type")]
    #[graphql(name = "type")]
    #[schema(example = "Bearer")]
    pub token_type: String,
}

impl Authorization {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }
}

/// Response envelope for credential flows
#[derive(Debug, Clone, Serialize, SimpleObject, ToSchema)]
#[graphql(name = "AuthResponse")]
pub struct AuthResult {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,
}

impl AuthResult {
    pub fn with_token(message: &str, access_token: String) -> Self {
        Self {
            message: message.to_string(),
            authorization: Some(Authorization::bearer(access_token)),
        }
    }

    pub fn message_only(message: &str) -> Self {
        Self {
            message: message.to_string(),
            authorization: None,
        }
    }
}

/// Message-only response for biometric key management
#[derive(Debug, Clone, Serialize, SimpleObject, ToSchema)]
pub struct BiometricResponse {
    pub message: String,
}

impl From<AuthResult> for BiometricResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            message: result.message,
        }
    }
}

/// Email change for an existing user
#[derive(Debug, Clone, Deserialize, Validate, InputObject, ToSchema)]
pub struct UpdateUserInput {
    /// Target user id
    pub id: String,
    /// New email address
    #[validate(email(message = "email must be an email"))]
    pub email: String,
}
