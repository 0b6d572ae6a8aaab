use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::database::repository::{ExpertRepository, UserRepository};
use crate::error::ApiError;
use crate::models::{Expert, NewExpert, NewUser, User};

const USER_COLUMNS: &str = "id, email, image, identifier";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE identifier = $1 ORDER BY id"
        ))
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let inserted = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, image, identifier)
             VALUES ($1, $2, $3)
             ON CONFLICT (identifier) DO NOTHING
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.image)
        .bind(&user.identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_value_too_long(&e) {
                ApiError::InvalidProfile
            } else {
                ApiError::Database(e)
            }
        })?;

        if let Some(created) = inserted {
            return Ok(created);
        }

        // Lost the race to a concurrent login for the same identifier
        debug!(identifier = %user.identifier, "User inserted concurrently, rereading");
        let existing = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE identifier = $1 ORDER BY id LIMIT 1"
        ))
        .bind(&user.identifier)
        .fetch_one(&self.pool)
        .await?;

        Ok(existing)
    }
}

#[derive(Clone)]
pub struct PgExpertRepository {
    pool: PgPool,
}

impl PgExpertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQLSTATE for a value longer than its `VARCHAR(n)` column
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

fn is_value_too_long(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err)
        if db_err.code().as_deref() == Some(STRING_DATA_RIGHT_TRUNCATION))
}

/// Translate constraint violations raised while inserting an expert into API errors.
fn map_expert_insert_error(err: sqlx::Error, expert: &NewExpert) -> ApiError {
    if is_value_too_long(&err) {
        return ApiError::InvalidValue(format!("value exceeds column width: {}", err));
    }
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some("experts_user_id_key") => return ApiError::ExistsExpert(expert.user_id),
            Some("experts_user_id_fkey") => return ApiError::InvalidUser(expert.user_id),
            Some("experts_category_id_fkey") => {
                return ApiError::InvalidCategory(expert.category_id)
            }
            Some("experts_position_id_fkey") => {
                return ApiError::InvalidPosition(expert.position_id)
            }
            _ => {}
        }
    }
    ApiError::Database(err)
}

#[async_trait]
impl ExpertRepository for PgExpertRepository {
    async fn category_exists(&self, id: i64) -> Result<bool, ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn position_exists(&self, id: i64) -> Result<bool, ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM positions WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_for_user(&self, user_id: i64) -> Result<bool, ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM experts WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, expert: NewExpert) -> Result<Expert, ApiError> {
        // Dropping the transaction without commit rolls everything back
        let mut tx = self.pool.begin().await?;

        let seller_info_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO seller_infos (address, phone_number, email)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(&expert.seller_info.address)
        .bind(&expert.seller_info.phone_number)
        .bind(&expert.seller_info.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_expert_insert_error(e, &expert))?;

        let created = sqlx::query_as::<_, Expert>(
            "INSERT INTO experts
                (user_id, position_id, category_id, seller_info_id, introduction, image, name)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, user_id, position_id, category_id, seller_info_id, introduction, image, name",
        )
        .bind(expert.user_id)
        .bind(expert.position_id)
        .bind(expert.category_id)
        .bind(seller_info_id)
        .bind(&expert.introduction)
        .bind(&expert.image)
        .bind(&expert.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_expert_insert_error(e, &expert))?;

        for tag in expert.normalized_hash_tags() {
            // DO UPDATE (not DO NOTHING) so RETURNING yields the existing id
            let hash_tag_id = sqlx::query_scalar::<_, i64>(
                "INSERT INTO hash_tags (name) VALUES ($1)
                 ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                 RETURNING id",
            )
            .bind(&tag)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_expert_insert_error(e, &expert))?;

            sqlx::query(
                "INSERT INTO expert_hash_tags (expert_id, hash_tag_id)
                 VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(created.id)
            .bind(hash_tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(created)
    }
}
