//! Router configuration.

use axum::{middleware::from_fn, routing::get, Json, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::handlers::{get_prometheus_metrics, health_check, users_routes};
use crate::middleware::{add_security_headers, metrics_middleware, request_logger_middleware};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Expert API",
        description = "Kakao social login and expert registration"
    ),
    paths(
        crate::handlers::health::health_check,
        crate::handlers::metrics::get_prometheus_metrics,
        crate::handlers::users::social_login::social_login,
        crate::handlers::users::expert::register_expert,
    ),
    components(schemas(
        crate::error::ErrorCode,
        crate::error::ErrorResponse,
        crate::config::StorageBackend,
        crate::handlers::health::HealthStatus,
        crate::handlers::users::ExpertRequest,
        crate::handlers::users::SellerInfoRequest,
        crate::handlers::users::MessageResponse,
        crate::handlers::users::SocialLoginResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "metrics", description = "Prometheus metrics"),
        (name = "users", description = "Social login and expert registration"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Both credentials travel as the raw `Authorization` header value
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "kakao_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Kakao access token",
            ))),
        );
        components.add_security_scheme(
            "session_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Session token issued by /users/social-login",
            ))),
        );
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.request_timeout);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_prometheus_metrics))
        .route("/api/docs/openapi.json", get(openapi_json))
        .nest("/users", users_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    axum::http::StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                .layer(CorsLayer::permissive())
                .layer(from_fn(add_security_headers))
                .layer(from_fn(request_logger_middleware))
                .layer(from_fn(metrics_middleware)),
        )
        .with_state(app_state)
}
