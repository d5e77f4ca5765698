//! Domain layer - Core business entities and logic
//!
//! Entities, request/response shapes, the secret hasher and the error
//! vocabulary of the credential store contract.

pub mod auth;
pub mod ports;
pub mod secret;
pub mod user;

pub use auth::{AuthResult, Authorization, BiometricResponse, Credential, UpdateUserInput};
pub use ports::StoreError;
pub use secret::{Argon2Hasher, HashError, SecretHasher};
pub use user::{User, UserResponse};
