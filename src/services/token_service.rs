//! Bearer token issuance and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    #[serde(rename = "user_email")]
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token failures. Expiry is kept apart from every other verification
/// failure so the guard can report it distinctly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token claims incomplete: missing {0}")]
    IncompleteClaims(&'static str),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("token has expired")]
    Expired,

    #[error("token is invalid")]
    Invalid,
}

/// Token issuer trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for the given subject and email
    fn issue(&self, subject: &str, email: &str) -> Result<String, TokenError>;

    /// Check signature and expiry, returning the decoded claims
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HMAC-SHA256 JWT issuer with a process-wide secret
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expires_in: Duration,
}

impl JwtIssuer {
    pub fn new(secret: &[u8], expires_in: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            expires_in,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.jwt_secret_bytes(), config.jwt_expires_in)
    }

    /// Sign a token as if issued at `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::IncompleteClaims("subject"));
        }
        if email.trim().is_empty() {
            return Err(TokenError::IncompleteClaims("email"));
        }

        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expires_in).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, subject: &str, email: &str) -> Result<String, TokenError> {
        self.issue_at(subject, email, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
