//! Authentication service - registration, standard login and the
//! biometric key flows.
//!
//! Each flow is one linear sequence of guarded steps. Component errors
//! are translated into [`AppError`] by `?`; already-classified errors pass
//! through untouched.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::biometric::BiometricMatcher;
use super::token_service::TokenIssuer;
use crate::config::{
    ERR_INVALID_BIOMETRIC_KEY, ERR_INVALID_LOGIN, MSG_BIOMETRIC_LOGGED_IN,
    MSG_BIOMETRIC_REGISTERED, MSG_BIOMETRIC_RESET, MSG_LOGGED_IN, MSG_REGISTERED,
};
use crate::domain::{AuthResult, Credential, SecretHasher, StoreError, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and return a token for it
    async fn register(&self, credential: Credential) -> AppResult<AuthResult>;

    /// Exchange email and password for a token
    async fn login(&self, credential: Credential) -> AppResult<AuthResult>;

    /// Attach a biometric key to an existing user
    async fn register_biometric(&self, user_id: &str, key: &str) -> AppResult<AuthResult>;

    /// Exchange a biometric key for a token
    async fn login_with_biometric(&self, key: &str) -> AppResult<AuthResult>;

    /// Replace a user's biometric key
    async fn reset_biometric_key(&self, user_id: &str, key: &str) -> AppResult<AuthResult>;
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn SecretHasher>,
    tokens: Arc<dyn TokenIssuer>,
    matcher: BiometricMatcher,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn SecretHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        let matcher = BiometricMatcher::new(hasher.clone());
        Self {
            users,
            hasher,
            tokens,
            matcher,
        }
    }

    fn issue_for(&self, user: &User) -> AppResult<String> {
        Ok(self.tokens.issue(&user.id.to_string(), &user.email)?)
    }

    /// Shared by biometric registration and reset; they differ only in
    /// the message returned.
    async fn store_biometric_key(&self, user_id: &str, key: &str) -> AppResult<User> {
        if key.is_empty() {
            return Err(AppError::EmptyBiometricKey);
        }

        let id = Uuid::parse_str(user_id).map_err(|_| AppError::UserNotFound)?;
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let hash = self.hasher.hash(key).await?;

        match self.users.update_biometric_hash(user.id, hash).await {
            Ok(updated) => Ok(updated),
            // Removed between lookup and update
            Err(StoreError::NotFound) => Err(AppError::UserNotFound),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, credential: Credential) -> AppResult<AuthResult> {
        // Advisory only; the unique index is the real guard.
        if self.users.find_by_email(&credential.email).await?.is_some() {
            tracing::warn!("Registration rejected: email already in use");
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(&credential.password).await?;

        // A concurrent registration surfaces here as a constraint violation,
        // which converts to DuplicateEmail.
        let user = self
            .users
            .create(credential.email, password_hash, None)
            .await?;

        let token = self.issue_for(&user)?;
        tracing::info!(user_id = %user.id, "User registered");

        Ok(AuthResult::with_token(MSG_REGISTERED, token))
    }

    async fn login(&self, credential: Credential) -> AppResult<AuthResult> {
        let user = self.users.find_by_email(&credential.email).await?;

        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            // Unknown email still pays for one verification.
            .unwrap_or(self.hasher.dummy_hash());
        let password_valid = self
            .hasher
            .compare(&credential.password, Some(stored_hash))
            .await;

        match user {
            Some(user) if password_valid => {
                let token = self.issue_for(&user)?;
                tracing::info!(user_id = %user.id, "Standard login succeeded");
                Ok(AuthResult::with_token(MSG_LOGGED_IN, token))
            }
            _ => {
                tracing::warn!("Standard login rejected");
                Err(AppError::InvalidCredentials(ERR_INVALID_LOGIN))
            }
        }
    }

    async fn register_biometric(&self, user_id: &str, key: &str) -> AppResult<AuthResult> {
        let user = self.store_biometric_key(user_id, key).await?;
        tracing::info!(user_id = %user.id, "Biometric key registered");
        Ok(AuthResult::message_only(MSG_BIOMETRIC_REGISTERED))
    }

    async fn login_with_biometric(&self, key: &str) -> AppResult<AuthResult> {
        if key.is_empty() {
            return Err(AppError::EmptyBiometricKey);
        }

        let candidates = self.users.list_with_biometric_hash().await?;
        let user = match self.matcher.find_match(key, candidates).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Biometric login rejected");
                return Err(AppError::InvalidCredentials(ERR_INVALID_BIOMETRIC_KEY));
            }
        };

        let token = self.issue_for(&user)?;
        tracing::info!(user_id = %user.id, "Biometric login succeeded");

        Ok(AuthResult::with_token(MSG_BIOMETRIC_LOGGED_IN, token))
    }

    async fn reset_biometric_key(&self, user_id: &str, key: &str) -> AppResult<AuthResult> {
        let user = self.store_biometric_key(user_id, key).await?;
        tracing::info!(user_id = %user.id, "Biometric key reset");
        Ok(AuthResult::message_only(MSG_BIOMETRIC_RESET))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HashError;
    use crate::infra::MockUserRepository;
    use crate::services::token_service::{MockTokenIssuer, TokenError};
    use mockall::predicate::eq;

    /// Reversible hasher so tests can assert on stored values.
    struct PlainHasher;

    #[async_trait]
    impl SecretHasher for PlainHasher {
        async fn hash(&self, secret: &str) -> Result<String, HashError> {
            if secret.is_empty() {
                return Err(HashError::EmptySecret);
            }
            Ok(format!("h:{secret}"))
        }

        async fn compare(&self, secret: &str, hash: Option<&str>) -> bool {
            hash == Some(format!("h:{secret}").as_str())
        }

        fn dummy_hash(&self) -> &str {
            "h:"
        }
    }

    /// Records every hash handed to `compare`.
    #[derive(Default)]
    struct RecordingHasher {
        compared: std::sync::Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl SecretHasher for RecordingHasher {
        async fn hash(&self, secret: &str) -> Result<String, HashError> {
            Ok(format!("h:{secret}"))
        }

        async fn compare(&self, _secret: &str, hash: Option<&str>) -> bool {
            self.compared.lock().unwrap().push(hash.map(str::to_string));
            false
        }

        fn dummy_hash(&self) -> &str {
            "dummy"
        }
    }

    fn create_test_user(email: &str, password: &str) -> User {
        User::new(Uuid::new_v4(), email.to_string(), format!("h:{password}"))
    }

    fn credential(email: &str, password: &str) -> Credential {
        Credential {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn token_issuer() -> MockTokenIssuer {
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_issue()
            .returning(|sub, _| Ok(format!("token-for-{sub}")));
        tokens
    }

    fn service(repo: MockUserRepository, tokens: MockTokenIssuer) -> Authenticator {
        Authenticator::new(Arc::new(repo), Arc::new(PlainHasher), Arc::new(tokens))
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("a@x.com"))
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|email, hash, bio| email == "a@x.com" && hash == "h:secret1" && bio.is_none())
            .returning(|email, hash, _| Ok(User::new(Uuid::new_v4(), email, hash)));

        let result = service(repo, token_issuer())
            .register(credential("a@x.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(result.message, "Registration successfully");
        let authorization = result.authorization.unwrap();
        assert!(authorization.access_token.starts_with("token-for-"));
        assert_eq!(authorization.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_precheck() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(create_test_user(email, "other"))));
        repo.expect_create().never();

        let err = service(repo, MockTokenIssuer::new())
            .register(credential("a@x.com", "secret1"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::DuplicateEmail);
    }

    #[tokio::test]
    async fn test_register_race_maps_constraint_to_duplicate() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create()
            .returning(|_, _, _| Err(StoreError::constraint("users_email_key")));

        let err = service(repo, MockTokenIssuer::new())
            .register(credential("a@x.com", "secret1"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::DuplicateEmail);
    }

    #[tokio::test]
    async fn test_register_backend_failure_is_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Err(StoreError::backend("connection refused")));

        let err = service(repo, MockTokenIssuer::new())
            .register(credential("a@x.com", "secret1"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::Internal("connection refused".into()));
    }

    #[tokio::test]
    async fn test_register_token_failure_is_internal() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_create()
            .returning(|email, hash, _| Ok(User::new(Uuid::new_v4(), email, hash)));
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_issue()
            .returning(|_, _| Err(TokenError::IncompleteClaims("email")));

        let err = service(repo, tokens)
            .register(credential("a@x.com", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(|email| Ok(Some(create_test_user(email, "secret1"))));

        let result = service(repo, token_issuer())
            .login(credential("a@x.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(result.message, "Login successfully");
        assert!(result.authorization.is_some());
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_are_identical() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .with(eq("a@x.com"))
            .returning(|email| Ok(Some(create_test_user(email, "secret1"))));
        repo.expect_find_by_email()
            .with(eq("nobody@x.com"))
            .returning(|_| Ok(None));
        let auth = service(repo, MockTokenIssuer::new());

        let wrong_password = auth
            .login(credential("a@x.com", "wrong1"))
            .await
            .unwrap_err();
        let unknown_email = auth
            .login(credential("nobody@x.com", "secret1"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_unknown_email_verifies_against_dummy_hash() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        let hasher = Arc::new(RecordingHasher::default());
        let auth = Authenticator::new(
            Arc::new(repo),
            hasher.clone(),
            Arc::new(MockTokenIssuer::new()),
        );

        let err = auth
            .login(credential("nobody@x.com", "secret1"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::InvalidCredentials("Invalid email or password"));
        assert_eq!(
            *hasher.compared.lock().unwrap(),
            vec![Some("dummy".to_string())]
        );
    }

    #[tokio::test]
    async fn test_register_biometric_success() {
        let user = create_test_user("a@x.com", "secret1");
        let user_id = user.id;

        let mut repo = MockUserRepository::new();
        let found = user.clone();
        repo.expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_update_biometric_hash()
            .with(eq(user_id), eq("h:bio123".to_string()))
            .returning(move |_, hash| {
                let mut updated = user.clone();
                updated.biometric_key_hash = Some(hash);
                Ok(updated)
            });

        let result = service(repo, MockTokenIssuer::new())
            .register_biometric(&user_id.to_string(), "bio123")
            .await
            .unwrap();

        assert_eq!(result.message, "Biometric registration successfully");
        assert!(result.authorization.is_none());
    }

    #[tokio::test]
    async fn test_reset_shares_registration_path() {
        let user = create_test_user("a@x.com", "secret1");
        let user_id = user.id;

        let mut repo = MockUserRepository::new();
        let found = user.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_update_biometric_hash()
            .times(1)
            .returning(move |_, _| Ok(user.clone()));

        let result = service(repo, MockTokenIssuer::new())
            .reset_biometric_key(&user_id.to_string(), "bio456")
            .await
            .unwrap();

        assert_eq!(result.message, "Biometric key reset successfully");
    }

    #[tokio::test]
    async fn test_biometric_registration_empty_key() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().never();

        let err = service(repo, MockTokenIssuer::new())
            .register_biometric(&Uuid::new_v4().to_string(), "")
            .await
            .unwrap_err();

        assert_eq!(err, AppError::EmptyBiometricKey);
    }

    #[tokio::test]
    async fn test_biometric_registration_unknown_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let auth = service(repo, MockTokenIssuer::new());
        let missing = auth
            .register_biometric(&Uuid::new_v4().to_string(), "bio123")
            .await
            .unwrap_err();
        let malformed = auth
            .reset_biometric_key("not-a-uuid", "bio123")
            .await
            .unwrap_err();

        assert_eq!(missing, AppError::UserNotFound);
        assert_eq!(malformed, AppError::UserNotFound);
    }

    #[tokio::test]
    async fn test_biometric_registration_user_removed_mid_flow() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(create_test_user("a@x.com", "secret1"))));
        repo.expect_update_biometric_hash()
            .returning(|_, _| Err(StoreError::NotFound));

        let err = service(repo, MockTokenIssuer::new())
            .register_biometric(&Uuid::new_v4().to_string(), "bio123")
            .await
            .unwrap_err();

        assert_eq!(err, AppError::UserNotFound);
    }

    #[tokio::test]
    async fn test_biometric_login_success() {
        let mut user = create_test_user("a@x.com", "secret1");
        user.biometric_key_hash = Some("h:bio123".into());
        let expected_sub = user.id.to_string();

        let mut repo = MockUserRepository::new();
        repo.expect_list_with_biometric_hash()
            .returning(move || Ok(vec![user.clone()]));
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_issue()
            .withf(move |sub, email| sub == expected_sub && email == "a@x.com")
            .returning(|_, _| Ok("signed".into()));

        let result = service(repo, tokens)
            .login_with_biometric("bio123")
            .await
            .unwrap();

        assert_eq!(result.message, "Login with biometric key was successful");
        assert_eq!(result.authorization.unwrap().access_token, "signed");
    }

    #[tokio::test]
    async fn test_biometric_login_failures() {
        let mut repo = MockUserRepository::new();
        repo.expect_list_with_biometric_hash()
            .times(1)
            .returning(|| Ok(vec![]));
        let auth = service(repo, MockTokenIssuer::new());

        assert_eq!(
            auth.login_with_biometric("").await.unwrap_err(),
            AppError::EmptyBiometricKey
        );
        assert_eq!(
            auth.login_with_biometric("bio123").await.unwrap_err(),
            AppError::NoBiometricUsersRegistered
        );
    }

    #[tokio::test]
    async fn test_biometric_login_no_match() {
        let mut user = create_test_user("a@x.com", "secret1");
        user.biometric_key_hash = Some("h:bio123".into());

        let mut repo = MockUserRepository::new();
        repo.expect_list_with_biometric_hash()
            .returning(move || Ok(vec![user.clone()]));

        let err = service(repo, MockTokenIssuer::new())
            .login_with_biometric("bio999")
            .await
            .unwrap_err();

        assert_eq!(err, AppError::InvalidCredentials("Invalid biometric key"));
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
