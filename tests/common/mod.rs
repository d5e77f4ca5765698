//! Shared fixtures for integration tests: an in-memory credential store
//! and a fully wired service stack over it.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use bioauth::config::HashSettings;
use bioauth::domain::{Argon2Hasher, StoreError, User};
use bioauth::infra::UserRepository;
use bioauth::services::{JwtIssuer, Services};
use bioauth::AppState;

pub const SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

/// Vec-backed store. Enforces email uniqueness like the real table.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub fn snapshot(&self) -> Vec<User> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn create(
        &self,
        email: String,
        password_hash: String,
        biometric_key_hash: Option<String>,
    ) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == email) {
            return Err(StoreError::constraint("users_email_key"));
        }

        let mut user = User::new(Uuid::new_v4(), email, password_hash);
        user.biometric_key_hash = biometric_key_hash;
        rows.push(user.clone());
        Ok(user)
    }

    async fn update_biometric_hash(&self, id: Uuid, hash: String) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.biometric_key_hash = Some(hash);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn list_with_biometric_hash(&self) -> Result<Vec<User>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|u| u.biometric_key_hash.is_some())
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.snapshot())
    }

    async fn update_email(&self, id: Uuid, email: String) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == email && u.id != id) {
            return Err(StoreError::constraint("users_email_key"));
        }
        let user = rows
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.email = email;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Argon2id with minimal cost so tests stay fast.
pub fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::new(HashSettings {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

pub fn issuer() -> JwtIssuer {
    JwtIssuer::new(SECRET, Duration::hours(1))
}

pub fn services(store: Arc<InMemoryUsers>) -> Services {
    Services::new(store, Arc::new(fast_hasher()), Arc::new(issuer()))
}

pub fn app_state(store: Arc<InMemoryUsers>) -> AppState {
    AppState::from_services(&services(store), None)
}
