//! Bearer-token authentication for the tool endpoint.
//!
//! The configured token is hashed once at startup. Each request's token is
//! hashed the same way and the digests are compared, so the plain token is
//! never kept in application state.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::{app::AppState, error::AppError};

/// SHA-256 of a token, hex encoded.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Authentication middleware function.
///
/// # Flow
///
/// 1. No token configured: pass the request through
/// 2. Extract `Authorization: Bearer <token>`
/// 3. Hash `<token>` with SHA-256 and compare against the configured digest
/// 4. Mismatch or missing header: 401 Unauthorized
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.auth_token_hash.as_deref() else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| hash_token(token.trim()))
        .ok_or(AppError::InvalidApiKey)?;

    if presented != expected {
        tracing::warn!("Rejected tool request with an invalid bearer token");
        return Err(AppError::InvalidApiKey);
    }

    Ok(next.run(request).await)
}
