//! Access guard middleware for REST routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::guard::{AccessGuard, Operation};
use crate::errors::AppError;

/// Gate one REST route with the capability of the operation it mirrors.
///
/// On success the verified claims (if any) are inserted into the request
/// extensions.
pub async fn require_capability(
    State((guard, operation)): State<(AccessGuard, Operation)>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Some(claims) = guard.authorize(operation, authorization)? {
        request.extensions_mut().insert(claims);
    }

    Ok(next.run(request).await)
}
