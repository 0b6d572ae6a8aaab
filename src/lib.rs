//! Expert marketplace API: Kakao social login and expert registration.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;
pub mod startup;

pub use app_state::AppState;
pub use config::Config;
pub use error::{ApiError, ErrorCode, Result};
pub use router::build_router;
