//! Application state shared across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::config::Config;
use crate::database::{ExpertRepository, UserRepository};
use crate::services::IdentityProvider;

/// Application state shared across handlers.
///
/// Storage and the identity provider sit behind trait objects so the router
/// runs unchanged against Postgres, the in-memory store, or a mock provider.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// User lookups and social-login upserts
    pub users: Arc<dyn UserRepository>,
    /// Expert registration and reference-data checks
    pub experts: Arc<dyn ExpertRepository>,
    /// Social-login provider (Kakao)
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Session token signing and verification
    pub jwt_service: JwtService,
    /// Prometheus exporter handle; `None` when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: Config,
        users: Arc<dyn UserRepository>,
        experts: Arc<dyn ExpertRepository>,
        identity_provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration);

        Self {
            config,
            users,
            experts,
            identity_provider,
            jwt_service,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}
