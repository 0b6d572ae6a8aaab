// HTTP handlers

pub mod health;
pub mod metrics;
pub mod users;

pub use health::health_check;
pub use self::metrics::get_prometheus_metrics;
pub use users::users_routes;
