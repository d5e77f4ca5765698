//! Credential store backed by the `users` table.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{StoreError, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Every write is a single atomic statement. Uniqueness of email is
/// enforced here, not by callers.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Create a new user
    async fn create(
        &self,
        email: String,
        password_hash: String,
        biometric_key_hash: Option<String>,
    ) -> Result<User, StoreError>;

    /// Set or overwrite the biometric key hash
    async fn update_biometric_hash(&self, id: Uuid, hash: String) -> Result<User, StoreError>;

    /// Users with a biometric key, oldest first
    async fn list_with_biometric_hash(&self) -> Result<Vec<User>, StoreError>;

    /// List all users
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Change a user's email address
    async fn update_email(&self, id: Uuid, email: String) -> Result<User, StoreError>;

    /// Delete user by ID
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Classify a driver error by what callers can act on.
fn classify(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return StoreError::ConstraintViolation(detail);
    }

    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => StoreError::NotFound,
        other => StoreError::Backend(other.to_string()),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(classify)?;

        Ok(result.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(classify)?;

        Ok(result.map(User::from))
    }

    async fn create(
        &self,
        email: String,
        password_hash: String,
        biometric_key_hash: Option<String>,
    ) -> Result<User, StoreError> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            biometric_key_hash: Set(biometric_key_hash),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(classify)?;
        Ok(User::from(model))
    }

    async fn update_biometric_hash(&self, id: Uuid, hash: String) -> Result<User, StoreError> {
        let active = ActiveModel {
            id: Set(id),
            biometric_key_hash: Set(Some(hash)),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active.update(&self.db).await.map_err(classify)?;
        Ok(User::from(model))
    }

    async fn list_with_biometric_hash(&self) -> Result<Vec<User>, StoreError> {
        let models = UserEntity::find()
            .filter(user::Column::BiometricKeyHash.is_not_null())
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(classify)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(classify)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn update_email(&self, id: Uuid, email: String) -> Result<User, StoreError> {
        let active = ActiveModel {
            id: Set(id),
            email: Set(email),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active.update(&self.db).await.map_err(classify)?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(classify)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_errors_classified_as_not_found() {
        assert_eq!(
            classify(DbErr::RecordNotFound("users".into())),
            StoreError::NotFound
        );
        assert_eq!(classify(DbErr::RecordNotUpdated), StoreError::NotFound);
    }

    #[test]
    fn test_other_errors_classified_as_backend() {
        let err = classify(DbErr::Custom("pool timed out".into()));
        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("pool timed out")));
    }
}
