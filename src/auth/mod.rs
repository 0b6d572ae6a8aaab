use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod jwt;
pub mod middleware;

pub use jwt::JwtService;
pub use middleware::{bearer_token, AuthenticatedUser};

/// Session token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub user_id: i64, // Internal user id
    pub iat: i64,     // Issued at
    pub exp: i64,     // Expiration time
}

impl Claims {
    pub fn new(user_id: i64, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        let exp = now + chrono::Duration::seconds(ttl_seconds);

        Self {
            user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}
