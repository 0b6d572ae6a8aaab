use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Column widths in the `users` table
pub const MAX_USER_EMAIL_LENGTH: usize = 200;
pub const MAX_USER_IMAGE_LENGTH: usize = 2000;
pub const MAX_IDENTIFIER_LENGTH: usize = 200;

/// A marketplace account, keyed by the identifier the social-login provider issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Profile image URL
    pub image: String,
    /// Provider identifier; `None` for accounts not created through social login
    pub identifier: Option<String>,
}

/// Insert payload for a first-time social login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub identifier: String,
    pub email: String,
    pub image: String,
}
