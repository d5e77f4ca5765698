//! REST mirror of the credential flows.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::post,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::guard::{AccessGuard, Operation};
use crate::api::middleware::require_capability;
use crate::api::AppState;
use crate::domain::{AuthResult, BiometricResponse, Credential};
use crate::errors::AppResult;
use crate::services::Claims;

/// Biometric login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BiometricLoginRequest {
    /// Raw biometric key
    #[schema(example = "bio123")]
    pub biometric_key: String,
}

/// Biometric key registration or reset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BiometricKeyRequest {
    /// Target user id
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub user_id: String,
    /// Raw biometric key
    #[schema(example = "bio123")]
    pub biometric_key: String,
}

/// Create authentication routes, each gated by the capability of the
/// operation it mirrors.
pub fn auth_routes(guard: AccessGuard) -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            post(register).route_layer(middleware::from_fn_with_state(
                (guard.clone(), Operation::StandardRegistration),
                require_capability,
            )),
        )
        .route(
            "/login",
            post(login).route_layer(middleware::from_fn_with_state(
                (guard.clone(), Operation::StandardLogin),
                require_capability,
            )),
        )
        .route(
            "/biometric/login",
            post(login_with_biometric).route_layer(middleware::from_fn_with_state(
                (guard.clone(), Operation::LoginWithBiometric),
                require_capability,
            )),
        )
        .route(
            "/biometric/register",
            post(register_biometric).route_layer(middleware::from_fn_with_state(
                (guard.clone(), Operation::RegisterBiometric),
                require_capability,
            )),
        )
        .route(
            "/biometric/reset",
            post(reset_biometric_key).route_layer(middleware::from_fn_with_state(
                (guard, Operation::ResetBiometricKey),
                require_capability,
            )),
        )
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = Credential,
    responses(
        (status = 201, description = "User registered", body = AuthResult),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<Credential>,
) -> AppResult<(StatusCode, Json<AuthResult>)> {
    let result = state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = Credential,
    responses(
        (status = 200, description = "Login successful", body = AuthResult),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<Credential>,
) -> AppResult<Json<AuthResult>> {
    Ok(Json(state.auth_service.login(payload).await?))
}

/// Login with a biometric key
#[utoipa::path(
    post,
    path = "/auth/biometric/login",
    tag = "Biometric",
    request_body = BiometricLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResult),
        (status = 400, description = "Empty biometric key"),
        (status = 401, description = "No match or no biometric users")
    )
)]
pub async fn login_with_biometric(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BiometricLoginRequest>,
) -> AppResult<Json<AuthResult>> {
    Ok(Json(
        state
            .auth_service
            .login_with_biometric(&payload.biometric_key)
            .await?,
    ))
}

/// Register a biometric key for a user
#[utoipa::path(
    post,
    path = "/auth/biometric/register",
    tag = "Biometric",
    request_body = BiometricKeyRequest,
    responses(
        (status = 200, description = "Key registered", body = BiometricResponse),
        (status = 400, description = "Empty biometric key"),
        (status = 401, description = "Missing, expired or invalid token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_biometric(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<BiometricKeyRequest>,
) -> AppResult<Json<BiometricResponse>> {
    tracing::debug!(requested_by = %claims.sub, "Biometric registration requested");
    let result = state
        .auth_service
        .register_biometric(&payload.user_id, &payload.biometric_key)
        .await?;
    Ok(Json(result.into()))
}

/// Replace a user's biometric key
#[utoipa::path(
    post,
    path = "/auth/biometric/reset",
    tag = "Biometric",
    request_body = BiometricKeyRequest,
    responses(
        (status = 200, description = "Key reset", body = BiometricResponse),
        (status = 400, description = "Empty biometric key"),
        (status = 401, description = "Missing, expired or invalid token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reset_biometric_key(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<BiometricKeyRequest>,
) -> AppResult<Json<BiometricResponse>> {
    tracing::debug!(requested_by = %claims.sub, "Biometric reset requested");
    let result = state
        .auth_service
        .reset_biometric_key(&payload.user_id, &payload.biometric_key)
        .await?;
    Ok(Json(result.into()))
}
