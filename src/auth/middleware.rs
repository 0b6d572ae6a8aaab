use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use tracing::debug;

use crate::error::ApiError;
use crate::middleware::metrics::track_auth_failure;
use crate::models::User;
use crate::AppState;

/// Read the credential from the `Authorization` header.
///
/// Clients send the raw token; a `Bearer ` prefix is accepted and stripped.
/// A missing, non-ASCII or blank header yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.get(..6) {
        Some(scheme)
            if scheme.eq_ignore_ascii_case("bearer")
                && (value.len() == 6 || value[6..].starts_with(' ')) =>
        {
            value[6..].trim()
        }
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// The user a session token resolves to. Protected handlers take this as an extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            track_auth_failure("missing_session_token");
            ApiError::InvalidToken("missing session token".to_string())
        })?;

        let claims = state.jwt_service.decode_token(token).inspect_err(|_| {
            track_auth_failure("invalid_session_token");
        })?;

        let user = state
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| {
                track_auth_failure("unknown_user");
                ApiError::InvalidUser(claims.user_id)
            })?;

        debug!(user_id = user.id, "Session token accepted");
        Ok(AuthenticatedUser(user))
    }
}
