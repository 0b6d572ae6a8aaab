//! Application startup and initialization logic.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{Config, StorageBackend};
use crate::database::{
    self, ExpertRepository, MemoryStore, PgExpertRepository, PgUserRepository, UserRepository,
};
use crate::services::KakaoClient;

/// Install the global tracing subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "expert_api={level},tower_http={level}",
            level = config.log_level
        ))
    });

    if config.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Initialize storage, the identity provider and metrics, and create the AppState.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    info!(environment = %config.environment, "Starting expert API");

    // Initialize Prometheus metrics exporter
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("Prometheus metrics initialized");

    let (users, experts) = setup_storage(config).await?;

    let identity_provider = Arc::new(KakaoClient::new(&config.kakao)?);
    info!(
        user_info_url = %config.kakao.user_info_url,
        timeout_secs = config.kakao.timeout,
        "Kakao client initialized"
    );

    let app_state =
        AppState::new(config.clone(), users, experts, identity_provider).with_metrics(metrics_handle);

    info!("AppState created successfully");
    Ok(app_state)
}

async fn setup_storage(
    config: &Config,
) -> Result<(Arc<dyn UserRepository>, Arc<dyn ExpertRepository>)> {
    match config.storage {
        StorageBackend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL environment variable is required for postgres storage")
            })?;

            let pool = database::setup_database(database_url, config.max_connections).await?;
            database::run_migrations(&pool).await?;
            info!("PostgreSQL storage ready");

            let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
            let experts: Arc<dyn ExpertRepository> = Arc::new(PgExpertRepository::new(pool));
            Ok((users, experts))
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("In-memory storage selected in production; data is lost on restart");
            }
            let store = Arc::new(MemoryStore::new());
            info!("In-memory storage ready");

            let users: Arc<dyn UserRepository> = store.clone();
            let experts: Arc<dyn ExpertRepository> = store;
            Ok((users, experts))
        }
    }
}
