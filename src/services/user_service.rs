//! User service - account listing and maintenance.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{StoreError, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Get user by ID
    async fn get_user(&self, id: &str) -> AppResult<User>;

    /// Change a user's email
    async fn update_email(&self, id: &str, email: String) -> AppResult<User>;

    /// Delete a user, returning a confirmation message
    async fn remove_user(&self, id: &str) -> AppResult<String>;
}

/// Concrete implementation of UserService
pub struct UserManager {
    users: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

fn missing(id: &str) -> AppError {
    AppError::not_found(format!("User with ID {} not found.", id))
}

/// A malformed id addresses no user.
fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| missing(id))
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.users.list().await?)
    }

    async fn get_user(&self, id: &str) -> AppResult<User> {
        let uuid = parse_id(id)?;
        self.users
            .find_by_id(uuid)
            .await?
            .ok_or_else(|| missing(id))
    }

    async fn update_email(&self, id: &str, email: String) -> AppResult<User> {
        let uuid = parse_id(id)?;
        match self.users.update_email(uuid, email).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User email updated");
                Ok(user)
            }
            Err(StoreError::NotFound) => Err(missing(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_user(&self, id: &str) -> AppResult<String> {
        let uuid = parse_id(id)?;
        match self.users.delete(uuid).await {
            Ok(()) => {
                tracing::info!(user_id = %uuid, "User removed");
                Ok(format!("User with ID {} has been removed successfully.", id))
            }
            Err(StoreError::NotFound) => Err(missing(id)),
            Err(e) => Err(e.into()),
        }
    }
}
