use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use utoipa::ToSchema;

const DEFAULT_KAKAO_USER_INFO_URL: &str = "https://kapi.kakao.com/v2/user/me";

/// Where users and experts are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown STORAGE backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub storage: StorageBackend,
    /// Required when `storage` is `Postgres`
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt_secret: String,
    /// Session token lifetime in seconds
    pub jwt_expiration: i64,
    pub request_timeout: u64,
    pub log_level: String,
    pub json_logs: bool,
    pub kakao: KakaoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KakaoConfig {
    pub user_info_url: String,
    /// Timeout for the user-info call, in seconds
    pub timeout: u64,
}

impl Default for KakaoConfig {
    fn default() -> Self {
        Self {
            user_info_url: DEFAULT_KAKAO_USER_INFO_URL.to_string(),
            timeout: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let storage: StorageBackend = env::var("STORAGE")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL environment variable is required for postgres storage"
            ));
        }

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,
            storage,
            database_url,
            max_connections: env::var("MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            jwt_expiration: env::var("JWT_EXPIRATION")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
            request_timeout: env::var("REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            json_logs: env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            kakao: KakaoConfig {
                user_info_url: env::var("KAKAO_USER_INFO_URL")
                    .unwrap_or_else(|_| DEFAULT_KAKAO_USER_INFO_URL.to_string()),
                timeout: env::var("PROVIDER_TIMEOUT")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
