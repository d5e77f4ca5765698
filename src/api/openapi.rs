//! OpenAPI documentation for the REST mirror.
//!
//! The GraphQL schema documents itself through introspection.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::auth_handler;
use crate::domain::{AuthResult, Authorization, BiometricResponse, Credential};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "bioauth",
        version = "0.1.0",
        description = "Email/password and biometric-key authentication issuing JWT bearer tokens",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::login_with_biometric,
        auth_handler::register_biometric,
        auth_handler::reset_biometric_key,
    ),
    components(
        schemas(
            Credential,
            AuthResult,
            Authorization,
            BiometricResponse,
            auth_handler::BiometricLoginRequest,
            auth_handler::BiometricKeyRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and password login"),
        (name = "Biometric", description = "Biometric key login and management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT obtained from /auth/login or /auth/register"))
                        .build(),
                ),
            );
        }
    }
}
