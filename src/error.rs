use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Machine-readable codes returned in the `message` field of every error body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request validation
    KeyError,
    InvalidValue,
    InvalidProfile,
    InvalidCategory,
    InvalidPosition,

    // Data integrity
    MultipleObjectReturned,
    ExistsExpert,

    // Authentication
    InvalidToken,
    InvalidUser,

    // Upstream / internal
    ProviderUnavailable,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::KeyError => "KEY_ERROR",
            ErrorCode::InvalidValue => "INVALID_VALUE",
            ErrorCode::InvalidProfile => "INVALID_PROFILE",
            ErrorCode::InvalidCategory => "INVALID_CATEGORY",
            ErrorCode::InvalidPosition => "INVALID_POSITION",
            ErrorCode::MultipleObjectReturned => "MULTIPLE_OBJECT_RETURNED",
            ErrorCode::ExistsExpert => "EXISTS_EXPERT",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidUser => "INVALID_USER",
            ErrorCode::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Body of every error response: `{"message": "<CODE>"}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: ErrorCode,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required key: {0}")]
    KeyError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Provider profile has no image")]
    InvalidProfile,

    #[error("Category {0} does not exist")]
    InvalidCategory(i64),

    #[error("Position {0} does not exist")]
    InvalidPosition(i64),

    #[error("{count} users share provider identifier {identifier}")]
    MultipleObjectReturned { identifier: String, count: usize },

    #[error("User {0} is already registered as an expert")]
    ExistsExpert(i64),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User {0} from session token does not exist")]
    InvalidUser(i64),

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::KeyError(_) => ErrorCode::KeyError,
            ApiError::InvalidValue(_) => ErrorCode::InvalidValue,
            ApiError::InvalidProfile => ErrorCode::InvalidProfile,
            ApiError::InvalidCategory(_) => ErrorCode::InvalidCategory,
            ApiError::InvalidPosition(_) => ErrorCode::InvalidPosition,
            ApiError::MultipleObjectReturned { .. } => ErrorCode::MultipleObjectReturned,
            ApiError::ExistsExpert(_) => ErrorCode::ExistsExpert,
            ApiError::InvalidToken(_) => ErrorCode::InvalidToken,
            ApiError::InvalidUser(_) => ErrorCode::InvalidUser,
            ApiError::ProviderUnavailable(_) => ErrorCode::ProviderUnavailable,
            ApiError::Database(_) | ApiError::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::KeyError(_)
            | ApiError::InvalidValue(_)
            | ApiError::InvalidProfile
            | ApiError::InvalidCategory(_)
            | ApiError::InvalidPosition(_)
            | ApiError::MultipleObjectReturned { .. }
            | ApiError::ExistsExpert(_) => StatusCode::BAD_REQUEST,

            ApiError::InvalidToken(_) | ApiError::InvalidUser(_) => StatusCode::UNAUTHORIZED,

            ApiError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,

            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log error with appropriate level
    fn log_error(&self) {
        let code = self.code();
        match self.status_code() {
            status if status.is_server_error() => {
                error!(code = code.as_str(), error = %self, "Server error occurred");
            }
            status if status.is_client_error() => {
                warn!(code = code.as_str(), error = %self, "Client error occurred");
            }
            _ => {}
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_error();

        let body = ErrorResponse {
            message: self.code(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
