//! Service container - the composition root.
//!
//! Collaborators are passed in explicitly; nothing is looked up from a
//! global registry.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{AuthService, Authenticator, JwtIssuer, TokenIssuer, UserManager, UserService};
use crate::config::Config;
use crate::domain::{Argon2Hasher, SecretHasher};
use crate::errors::AppResult;
use crate::infra::{UserRepository, UserStore};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get token issuer (used by the access guard)
    fn tokens(&self) -> Arc<dyn TokenIssuer>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    token_issuer: Arc<dyn TokenIssuer>,
}

impl Services {
    /// Wire services from their leaf collaborators
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn SecretHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        let auth_service = Arc::new(Authenticator::new(
            repository.clone(),
            hasher,
            tokens.clone(),
        ));
        let user_service = Arc::new(UserManager::new(repository));

        Self {
            auth_service,
            user_service,
            token_issuer: tokens,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: DatabaseConnection, config: &Config) -> AppResult<Self> {
        let repository = Arc::new(UserStore::new(db));
        let hasher = Arc::new(Argon2Hasher::new(config.hash)?);
        let tokens = Arc::new(JwtIssuer::from_config(config));

        Ok(Self::new(repository, hasher, tokens))
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn tokens(&self) -> Arc<dyn TokenIssuer> {
        self.token_issuer.clone()
    }
}
