//! Credential mutations.

use std::sync::Arc;

use async_graphql::{Context, Object, Result, ResultExt};

use crate::api::extractors::validate_input;
use crate::domain::{AuthResult, BiometricResponse, Credential};
use crate::services::AuthService;

#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    /// Create an account and sign in.
    async fn standard_registeration(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "createUserInput")] input: Credential,
    ) -> Result<AuthResult> {
        validate_input(&input).extend()?;
        let auth = ctx.data::<Arc<dyn AuthService>>()?;
        auth.register(input).await.extend()
    }

    /// Sign in with email and password.
    async fn standard_login(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "creatStandardLoginInput")] input: Credential,
    ) -> Result<AuthResult> {
        validate_input(&input).extend()?;
        let auth = ctx.data::<Arc<dyn AuthService>>()?;
        auth.login(input).await.extend()
    }

    async fn register_biometric(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        #[graphql(name = "biometricKeyRegisterInput")] biometric_key: String,
    ) -> Result<BiometricResponse> {
        let auth = ctx.data::<Arc<dyn AuthService>>()?;
        auth.register_biometric(&user_id, &biometric_key)
            .await
            .map(BiometricResponse::from)
            .extend()
    }

    /// Sign in with a previously registered biometric key.
    async fn login_with_biometric(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "biometricKeyLoginInput")] biometric_key: String,
    ) -> Result<AuthResult> {
        let auth = ctx.data::<Arc<dyn AuthService>>()?;
        auth.login_with_biometric(&biometric_key).await.extend()
    }

    async fn reset_biometric_key(
        &self,
        ctx: &Context<'_>,
        user_id: String,
        #[graphql(name = "biometricKeyResetInput")] biometric_key: String,
    ) -> Result<BiometricResponse> {
        let auth = ctx.data::<Arc<dyn AuthService>>()?;
        auth.reset_biometric_key(&user_id, &biometric_key)
            .await
            .map(BiometricResponse::from)
            .extend()
    }
}
