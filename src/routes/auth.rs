//! Bearer-token gate for protected routes.

use axum::extract::FromRef;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::error::ApiError;
use crate::services::identity::{AuthError, Identity};
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Only the first space-separated word after the scheme is used. Returns
/// `None` for a missing header, another scheme, or an empty token.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let rest = value.strip_prefix(BEARER_PREFIX)?;
    rest.split(' ').next().filter(|token| !token.is_empty())
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Caller verified by the identity provider.
/// Use as a handler parameter to require authentication. It must come before
/// any body extractor so rejected requests never reach the store.
pub struct AuthUser {
    pub identity: Identity,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Err(ApiError::Unauthorized);
        };

        let app_state = AppState::from_ref(state);
        match app_state.verifier.verify(token).await {
            Ok(identity) => Ok(Self { identity }),
            Err(AuthError::MissingToken) => Err(ApiError::Unauthorized),
            Err(e) => {
                tracing::warn!(error = %e, "token verification failed");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
