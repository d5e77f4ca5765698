//! Access guard.
//!
//! Every operation the service exposes has an entry in [`CAPABILITIES`].
//! Public operations bypass the guard entirely; anything else, including
//! operations missing from the table, requires a valid bearer token.

use std::sync::Arc;

use crate::config::{BEARER_TOKEN_PREFIX, ERR_NO_TOKEN};
use crate::errors::{AppError, AppResult};
use crate::services::{Claims, TokenIssuer};

/// Operations exposed over GraphQL (and mirrored over REST where noted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    StandardRegistration,
    StandardLogin,
    RegisterBiometric,
    LoginWithBiometric,
    ResetBiometricKey,
    AllUsers,
    OneUser,
    UpdateUser,
    RemoveUser,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::StandardRegistration,
        Operation::StandardLogin,
        Operation::RegisterBiometric,
        Operation::LoginWithBiometric,
        Operation::ResetBiometricKey,
        Operation::AllUsers,
        Operation::OneUser,
        Operation::UpdateUser,
        Operation::RemoveUser,
    ];

    /// GraphQL root field name
    pub fn field_name(self) -> &'static str {
        match self {
            // Spelling is part of the public schema.
            Operation::StandardRegistration => "standardRegisteration",
            Operation::StandardLogin => "standardLogin",
            Operation::RegisterBiometric => "registerBiometric",
            Operation::LoginWithBiometric => "loginWithBiometric",
            Operation::ResetBiometricKey => "resetBiometricKey",
            Operation::AllUsers => "allUsers",
            Operation::OneUser => "oneUser",
            Operation::UpdateUser => "updateUser",
            Operation::RemoveUser => "removeUser",
        }
    }

    pub fn from_field(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.field_name() == name)
    }

    pub fn capability(self) -> Capability {
        CAPABILITIES
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, capability)| *capability)
            .unwrap_or(Capability::PROTECTED)
    }
}

/// What the guard demands before an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub public: bool,
}

impl Capability {
    pub const PUBLIC: Capability = Capability { public: true };
    pub const PROTECTED: Capability = Capability { public: false };
}

/// Operation -> capability table
pub const CAPABILITIES: &[(Operation, Capability)] = &[
    (Operation::StandardRegistration, Capability::PUBLIC),
    (Operation::StandardLogin, Capability::PUBLIC),
    (Operation::LoginWithBiometric, Capability::PUBLIC),
    (Operation::RegisterBiometric, Capability::PROTECTED),
    (Operation::ResetBiometricKey, Capability::PROTECTED),
    (Operation::AllUsers, Capability::PROTECTED),
    (Operation::OneUser, Capability::PROTECTED),
    (Operation::UpdateUser, Capability::PROTECTED),
    (Operation::RemoveUser, Capability::PROTECTED),
];

/// Whether a GraphQL root field may run without a token.
///
/// Introspection (`__schema`, `__type`, `__typename`) is public; unknown
/// fields are not.
pub fn field_is_public(field: &str) -> bool {
    if field.starts_with("__") {
        return true;
    }
    Operation::from_field(field)
        .map(|op| op.capability().public)
        .unwrap_or(false)
}

/// Per-request gate evaluated before any service call
#[derive(Clone)]
pub struct AccessGuard {
    tokens: Arc<dyn TokenIssuer>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { tokens }
    }

    /// Gate a single operation. Public operations yield `None`; protected
    /// ones yield the verified claims.
    pub fn authorize(
        &self,
        operation: Operation,
        authorization: Option<&str>,
    ) -> AppResult<Option<Claims>> {
        if operation.capability().public {
            return Ok(None);
        }
        self.authenticate(authorization).map(Some)
    }

    /// Gate a request selecting several root fields. The token is checked
    /// once if any field is protected.
    pub fn authorize_fields<'a, I>(
        &self,
        fields: I,
        authorization: Option<&str>,
    ) -> AppResult<Option<Claims>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if fields.into_iter().all(field_is_public) {
            return Ok(None);
        }
        self.authenticate(authorization).map(Some)
    }

    /// Verify an `Authorization` header value.
    ///
    /// # Errors
    /// `Unauthenticated` with "No token provided", "Token has expired" or
    /// "Invalid token".
    pub fn authenticate(&self, authorization: Option<&str>) -> AppResult<Claims> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AppError::Unauthenticated(ERR_NO_TOKEN))?;

        Ok(self.tokens.verify(token)?)
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
