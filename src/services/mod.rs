//! Application services layer - Use cases and business logic.
//!
//! Services depend on traits (`UserRepository`, `SecretHasher`,
//! `TokenIssuer`) and receive their collaborators through constructors.

mod auth_service;
mod biometric;
pub mod container;
mod token_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator};
pub use biometric::BiometricMatcher;
pub use token_service::{Claims, JwtIssuer, TokenError, TokenIssuer};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use token_service::MockTokenIssuer;
