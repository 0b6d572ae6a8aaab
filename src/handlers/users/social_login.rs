use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use tracing::{info, warn};

use super::types::{SocialLoginResponse, SUCCESS};
use crate::auth::bearer_token;
use crate::error::{ApiError, ErrorResponse, Result};
use crate::middleware::metrics::{track_auth_attempt, track_auth_failure};
use crate::models::{NewUser, User};
use crate::AppState;

const LOGIN_METHOD: &str = "kakao";

/// Exchange a Kakao access token for a session token
///
/// The caller sends the provider access token in `Authorization`. The
/// user is created on first login and reused afterwards.
#[utoipa::path(
    post,
    path = "/users/social-login",
    tag = "users",
    responses(
        (status = 201, description = "Logged in", body = SocialLoginResponse),
        (status = 400, description = "KEY_ERROR, INVALID_PROFILE or MULTIPLE_OBJECT_RETURNED", body = ErrorResponse),
        (status = 401, description = "INVALID_TOKEN", body = ErrorResponse),
        (status = 502, description = "PROVIDER_UNAVAILABLE", body = ErrorResponse)
    ),
    security(
        ("kakao_token" = [])
    )
)]
pub async fn social_login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<SocialLoginResponse>)> {
    match login(&state, &headers).await {
        Ok(response) => {
            track_auth_attempt(true, LOGIN_METHOD);
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(e) => {
            track_auth_attempt(false, LOGIN_METHOD);
            track_auth_failure(e.code().as_str());
            Err(e)
        }
    }
}

async fn login(state: &AppState, headers: &HeaderMap) -> Result<SocialLoginResponse> {
    let access_token = bearer_token(headers)
        .ok_or_else(|| ApiError::InvalidToken("missing provider access token".to_string()))?;

    let profile = state.identity_provider.fetch_profile(access_token).await?;

    let user = find_or_create_user(
        state,
        NewUser {
            identifier: profile.identifier,
            email: profile.email,
            image: profile.image.clone(),
        },
    )
    .await?;

    let access_token = state.jwt_service.issue_token(user.id)?;

    Ok(SocialLoginResponse {
        message: SUCCESS.to_string(),
        access_token,
        profile: profile.image,
    })
}

async fn find_or_create_user(state: &AppState, new_user: NewUser) -> Result<User> {
    let mut existing = state.users.find_by_identifier(&new_user.identifier).await?;

    match existing.len() {
        0 => {
            let user = state.users.create(new_user).await?;
            info!(user_id = user.id, "Created user on first social login");
            Ok(user)
        }
        1 => Ok(existing.remove(0)),
        count => {
            warn!(
                identifier = %new_user.identifier,
                count,
                "Provider identifier matches several users"
            );
            Err(ApiError::MultipleObjectReturned {
                identifier: new_user.identifier,
                count,
            })
        }
    }
}
