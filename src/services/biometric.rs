//! Biometric key matching.
//!
//! Stored biometric hashes are salted and one-way, so a candidate key can
//! only be located by comparing it against every registered hash.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::config::BIOMETRIC_COMPARE_CONCURRENCY;
use crate::domain::{SecretHasher, User};
use crate::errors::{AppError, AppResult};

/// Finds the user whose biometric hash verifies against a candidate key.
#[derive(Clone)]
pub struct BiometricMatcher {
    hasher: Arc<dyn SecretHasher>,
}

impl BiometricMatcher {
    pub fn new(hasher: Arc<dyn SecretHasher>) -> Self {
        Self { hasher }
    }

    /// Compare `candidate` against every user in `users` and return the
    /// first match in the given order.
    ///
    /// All comparisons run to completion even after a hit, so the cost
    /// of a lookup does not depend on where the match sits. At most
    /// [`BIOMETRIC_COMPARE_CONCURRENCY`] run at once. Multiple matches are
    /// not disambiguated.
    ///
    /// # Errors
    /// `NoBiometricUsersRegistered` if `users` is empty.
    pub async fn find_match(&self, candidate: &str, users: Vec<User>) -> AppResult<Option<User>> {
        if users.is_empty() {
            return Err(AppError::NoBiometricUsersRegistered);
        }

        // `buffered` yields in input order, so the first hit is the oldest.
        let outcomes: Vec<(bool, User)> = stream::iter(users)
            .map(|user| async move {
                let matched = self
                    .hasher
                    .compare(candidate, user.biometric_key_hash.as_deref())
                    .await;
                (matched, user)
            })
            .buffered(BIOMETRIC_COMPARE_CONCURRENCY)
            .collect()
            .await;

        Ok(outcomes
            .into_iter()
            .find_map(|(matched, user)| matched.then_some(user)))
    }
}
