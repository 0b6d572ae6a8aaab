//! Storage seams for the handlers.
//!
//! Both traits have a Postgres implementation (`database::postgres`) and an
//! in-memory one (`database::memory`). Implementations must enforce the same
//! invariants the schema does:
//! - a provider identifier maps to at most one user created through `create`
//! - a user owns at most one expert
//! - expert creation is all-or-nothing

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Expert, NewExpert, NewUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every user carrying `identifier`. More than one row means legacy data
    /// predating the unique constraint; callers treat that as an integrity error.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<User>, ApiError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError>;

    /// Insert a user, or return the row a concurrent request inserted first
    /// for the same identifier. Values wider than their column are `InvalidProfile`.
    async fn create(&self, user: NewUser) -> Result<User, ApiError>;
}

#[async_trait]
pub trait ExpertRepository: Send + Sync {
    async fn category_exists(&self, id: i64) -> Result<bool, ApiError>;

    async fn position_exists(&self, id: i64) -> Result<bool, ApiError>;

    async fn exists_for_user(&self, user_id: i64) -> Result<bool, ApiError>;

    /// Create the seller info, the expert and its hash tags atomically.
    ///
    /// Fails with `ExistsExpert` if the user already has an expert, with
    /// `InvalidUser`, `InvalidCategory` or `InvalidPosition` on dangling
    /// references, and with `InvalidValue` when a value is wider than its
    /// column. Nothing is written on failure.
    async fn create(&self, expert: NewExpert) -> Result<Expert, ApiError>;
}
