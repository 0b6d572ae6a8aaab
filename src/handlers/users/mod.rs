// User-facing endpoints: social login and expert registration

pub mod expert;
pub mod social_login;
pub mod types;

use axum::{routing::post, Router};

use crate::AppState;

pub use expert::register_expert;
pub use social_login::social_login;
pub use types::{ExpertRequest, MessageResponse, SellerInfoRequest, SocialLoginResponse};

/// Routes mounted under `/users`
pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/social-login", post(social_login)) // POST /users/social-login
        .route("/expert", post(register_expert)) // POST /users/expert
}
