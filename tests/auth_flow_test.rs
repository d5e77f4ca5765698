//! End-to-end credential flows over the real hasher and token issuer.

mod common;

use std::sync::Arc;

use bioauth::domain::Credential;
use bioauth::services::{ServiceContainer, TokenIssuer};
use bioauth::AppError;

use common::{issuer, services, InMemoryUsers};

fn credential(email: &str, password: &str) -> Credential {
    Credential {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let container = services(Arc::new(InMemoryUsers::default()));
    let auth = container.auth();

    let result = auth
        .register(credential("a@x.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(result.message, "Registration successfully");
    let authorization = result.authorization.unwrap();
    assert!(!authorization.access_token.is_empty());
    assert_eq!(authorization.token_type, "Bearer");

    let err = auth
        .register(credential("a@x.com", "another1"))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::DuplicateEmail);
}

#[tokio::test]
async fn test_registration_stores_hash_not_password() {
    let store = Arc::new(InMemoryUsers::default());
    let auth = services(store.clone()).auth();

    auth.register(credential("a@x.com", "secret1"))
        .await
        .unwrap();

    let users = store.snapshot();
    assert_eq!(users.len(), 1);
    assert_ne!(users[0].password_hash, "secret1");
    assert!(users[0].password_hash.starts_with("$argon2id$"));
    assert!(users[0].biometric_key_hash.is_none());
}

#[tokio::test]
async fn test_login_issues_token_for_user() {
    let store = Arc::new(InMemoryUsers::default());
    let auth = services(store.clone()).auth();
    auth.register(credential("a@x.com", "secret1"))
        .await
        .unwrap();

    let result = auth.login(credential("a@x.com", "secret1")).await.unwrap();
    assert_eq!(result.message, "Login successfully");

    let token = result.authorization.unwrap().access_token;
    let claims = issuer().verify(&token).unwrap();
    assert_eq!(claims.sub, store.snapshot()[0].id.to_string());
    assert_eq!(claims.email, "a@x.com");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let auth = services(Arc::new(InMemoryUsers::default())).auth();
    auth.register(credential("a@x.com", "secret1"))
        .await
        .unwrap();

    let wrong_password = auth
        .login(credential("a@x.com", "wrong"))
        .await
        .unwrap_err();
    let unknown_email = auth
        .login(credential("nobody@x.com", "secret1"))
        .await
        .unwrap_err();

    assert_eq!(
        wrong_password,
        AppError::InvalidCredentials("Invalid email or password")
    );
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_biometric_register_and_login() {
    let store = Arc::new(InMemoryUsers::default());
    let auth = services(store.clone()).auth();
    auth.register(credential("a@x.com", "secret1"))
        .await
        .unwrap();
    auth.register(credential("b@x.com", "secret2"))
        .await
        .unwrap();
    let users = store.snapshot();
    let (first, second) = (users[0].id.to_string(), users[1].id.to_string());

    let registered = auth.register_biometric(&second, "bio123").await.unwrap();
    assert_eq!(registered.message, "Biometric registration successfully");
    assert!(registered.authorization.is_none());
    auth.register_biometric(&first, "other-key").await.unwrap();

    let result = auth.login_with_biometric("bio123").await.unwrap();
    assert_eq!(result.message, "Login with biometric key was successful");
    let claims = issuer()
        .verify(&result.authorization.unwrap().access_token)
        .unwrap();
    assert_eq!(claims.sub, second);
    assert_eq!(claims.email, "b@x.com");

    let err = auth.login_with_biometric("bio999").await.unwrap_err();
    assert_eq!(err, AppError::InvalidCredentials("Invalid biometric key"));
}

#[tokio::test]
async fn test_biometric_reset_replaces_key() {
    let store = Arc::new(InMemoryUsers::default());
    let auth = services(store.clone()).auth();
    auth.register(credential("a@x.com", "secret1"))
        .await
        .unwrap();
    let id = store.snapshot()[0].id.to_string();

    auth.register_biometric(&id, "old-key").await.unwrap();
    let reset = auth.reset_biometric_key(&id, "new-key").await.unwrap();
    assert_eq!(reset.message, "Biometric key reset successfully");

    assert!(auth.login_with_biometric("new-key").await.is_ok());
    assert_eq!(
        auth.login_with_biometric("old-key").await.unwrap_err(),
        AppError::InvalidCredentials("Invalid biometric key")
    );
}

#[tokio::test]
async fn test_biometric_edge_cases() {
    let store = Arc::new(InMemoryUsers::default());
    let auth = services(store.clone()).auth();

    assert_eq!(
        auth.login_with_biometric("bio123").await.unwrap_err(),
        AppError::NoBiometricUsersRegistered
    );
    assert_eq!(
        auth.login_with_biometric("").await.unwrap_err(),
        AppError::EmptyBiometricKey
    );
    assert_eq!(
        auth.register_biometric("not-a-uuid", "bio123")
            .await
            .unwrap_err(),
        AppError::UserNotFound
    );
    assert_eq!(
        auth.register_biometric(&uuid::Uuid::new_v4().to_string(), "bio123")
            .await
            .unwrap_err(),
        AppError::UserNotFound
    );

    auth.register(credential("a@x.com", "secret1"))
        .await
        .unwrap();
    let id = store.snapshot()[0].id.to_string();
    assert_eq!(
        auth.reset_biometric_key(&id, "").await.unwrap_err(),
        AppError::EmptyBiometricKey
    );
    assert!(store.snapshot()[0].biometric_key_hash.is_none());
}

#[tokio::test]
async fn test_user_management() {
    let store = Arc::new(InMemoryUsers::default());
    let container = services(store.clone());
    let (auth, users) = (container.auth(), container.users());

    auth.register(credential("a@x.com", "secret1"))
        .await
        .unwrap();
    auth.register(credential("b@x.com", "secret2"))
        .await
        .unwrap();
    let id = store.snapshot()[0].id.to_string();

    assert_eq!(users.list_users().await.unwrap().len(), 2);
    assert_eq!(users.get_user(&id).await.unwrap().email, "a@x.com");

    assert_eq!(
        users
            .update_email(&id, "b@x.com".to_string())
            .await
            .unwrap_err(),
        AppError::DuplicateEmail
    );
    let updated = users
        .update_email(&id, "c@x.com".to_string())
        .await
        .unwrap();
    assert_eq!(updated.email, "c@x.com");

    let message = users.remove_user(&id).await.unwrap();
    assert_eq!(
        message,
        format!("User with ID {} has been removed successfully.", id)
    );
    assert_eq!(
        users.get_user(&id).await.unwrap_err(),
        AppError::NotFound(format!("User with ID {} not found.", id))
    );
}
