//! Kakao identity provider client.
//!
//! Exchanges a caller-supplied Kakao access token for the account's identity
//! by calling the user-info endpoint (`/v2/user/me`).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::KakaoConfig;
use crate::error::{ApiError, Result};
use crate::models::{MAX_IDENTIFIER_LENGTH, MAX_USER_EMAIL_LENGTH, MAX_USER_IMAGE_LENGTH};

/// Identity asserted by the provider for the holder of an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub identifier: String,
    pub email: String,
    pub image: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile>;
}

#[derive(Debug, Deserialize)]
struct KakaoUserInfo {
    id: Option<serde_json::Value>,
    kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    profile: Option<KakaoProfile>,
}

#[derive(Debug, Deserialize)]
struct KakaoProfile {
    profile_image_url: Option<String>,
}

impl KakaoUserInfo {
    /// Missing id, account or email is a `KeyError`. A missing image, or any
    /// value too long to store, is `InvalidProfile`.
    fn into_profile(self) -> Result<ProviderProfile> {
        let identifier = match self.id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => return Err(ApiError::KeyError("id".to_string())),
        };

        let account = self
            .kakao_account
            .ok_or_else(|| ApiError::KeyError("kakao_account".to_string()))?;

        let email = account
            .email
            .ok_or_else(|| ApiError::KeyError("kakao_account.email".to_string()))?;

        let image = account
            .profile
            .and_then(|profile| profile.profile_image_url)
            .ok_or(ApiError::InvalidProfile)?;

        if identifier.chars().count() > MAX_IDENTIFIER_LENGTH
            || email.chars().count() > MAX_USER_EMAIL_LENGTH
            || image.chars().count() > MAX_USER_IMAGE_LENGTH
        {
            return Err(ApiError::InvalidProfile);
        }

        Ok(ProviderProfile {
            identifier,
            email,
            image,
        })
    }
}

#[derive(Clone)]
pub struct KakaoClient {
    http: reqwest::Client,
    user_info_url: String,
}

impl KakaoClient {
    pub fn new(config: &KakaoConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            http,
            user_info_url: config.user_info_url.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for KakaoClient {
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile> {
        let response = self
            .http
            .post(&self.user_info_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ApiError::ProviderUnavailable(format!("user-info request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(%status, "Kakao rate limit hit");
            return Err(ApiError::ProviderUnavailable(
                "user-info endpoint rate limited".to_string(),
            ));
        }
        if status.is_client_error() {
            debug!(%status, "Kakao rejected access token");
            return Err(ApiError::InvalidToken(format!(
                "provider rejected access token ({})",
                status
            )));
        }
        if !status.is_success() {
            warn!(%status, "Kakao user-info endpoint returned an error");
            return Err(ApiError::ProviderUnavailable(format!(
                "user-info endpoint returned {}",
                status
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            ApiError::ProviderUnavailable(format!("user-info body is not JSON: {}", e))
        })?;

        let user_info: KakaoUserInfo = serde_json::from_value(body)
            .map_err(|e| ApiError::KeyError(format!("malformed user-info payload: {}", e)))?;

        user_info.into_profile()
    }
}
