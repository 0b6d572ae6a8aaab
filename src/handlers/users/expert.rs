use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use tracing::info;
use validator::Validate;

use super::types::{ExpertRequest, MessageResponse};
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ErrorResponse, Result};
use crate::middleware::metrics::track_expert_registration;
use crate::AppState;

/// Register the authenticated user as an expert
///
/// Creates the seller info, the expert and its hash tags in one transaction.
/// A user can hold one expert listing.
#[utoipa::path(
    post,
    path = "/users/expert",
    tag = "users",
    request_body = ExpertRequest,
    responses(
        (status = 201, description = "Expert registered", body = MessageResponse),
        (status = 400, description = "KEY_ERROR, INVALID_VALUE, INVALID_CATEGORY, INVALID_POSITION or EXISTS_EXPERT", body = ErrorResponse),
        (status = 401, description = "INVALID_TOKEN or INVALID_USER", body = ErrorResponse)
    ),
    security(
        ("session_token" = [])
    )
)]
pub async fn register_expert(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    match register(&state, user.id, &body).await {
        Ok(expert_id) => {
            track_expert_registration("success");
            info!(user_id = user.id, expert_id, "Expert registered");
            Ok((StatusCode::CREATED, Json(MessageResponse::success())))
        }
        Err(e) => {
            track_expert_registration(e.code().as_str());
            Err(e)
        }
    }
}

async fn register(state: &AppState, user_id: i64, body: &[u8]) -> Result<i64> {
    let request = parse_request(body)?;

    if let Some(field) = request.missing_fields().first() {
        return Err(ApiError::KeyError(field.to_string()));
    }

    request
        .validate()
        .map_err(|e| ApiError::InvalidValue(format!("Validation error: {}", e)))?;

    let new_expert = request
        .into_new_expert(user_id)
        .ok_or_else(|| ApiError::Internal("expert request incomplete after validation".to_string()))?;

    if !state.experts.category_exists(new_expert.category_id).await? {
        return Err(ApiError::InvalidCategory(new_expert.category_id));
    }
    if !state.experts.position_exists(new_expert.position_id).await? {
        return Err(ApiError::InvalidPosition(new_expert.position_id));
    }
    if state.experts.exists_for_user(user_id).await? {
        return Err(ApiError::ExistsExpert(user_id));
    }

    // The repository re-checks all three under its own lock or transaction
    let expert = state.experts.create(new_expert).await?;
    Ok(expert.id)
}

/// Empty bodies, invalid JSON, non-object documents and mistyped fields are
/// all `INVALID_VALUE`. Missing keys are left to `missing_fields`.
fn parse_request(body: &[u8]) -> Result<ExpertRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::InvalidValue("request body is empty".to_string()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidValue(format!("request body is not JSON: {}", e)))?;

    if !value.is_object() {
        return Err(ApiError::InvalidValue(
            "request body must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidValue(format!("malformed expert request: {}", e)))
}
