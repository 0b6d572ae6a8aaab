//! In-memory store used by the test suite and by `STORAGE=memory` local runs.
//!
//! Every operation takes one lock, so each trait call is atomic the same way
//! a Postgres statement or transaction is.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::repository::{ExpertRepository, UserRepository};
use crate::error::ApiError;
use crate::models::{Category, Expert, NewExpert, NewUser, Position, SellerInfo, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    positions: Vec<Position>,
    categories: Vec<Category>,
    seller_infos: Vec<SellerInfo>,
    experts: Vec<Expert>,
    hash_tags: Vec<(i64, String)>,
    expert_hash_tags: Vec<(i64, i64)>,
    last_user_id: i64,
    last_seller_info_id: i64,
    last_expert_id: i64,
    last_hash_tag_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user row verbatim, bypassing the identifier uniqueness check.
    /// Used to load fixtures, including legacy duplicates.
    pub async fn insert_user(&self, user: User) {
        let mut tables = self.tables.write().await;
        tables.last_user_id = tables.last_user_id.max(user.id);
        tables.users.push(user);
    }

    pub async fn insert_position(&self, id: i64, name: &str) {
        let mut tables = self.tables.write().await;
        tables.positions.push(Position {
            id,
            name: name.to_string(),
        });
    }

    pub async fn insert_category(&self, id: i64, name: &str) {
        let mut tables = self.tables.write().await;
        tables.categories.push(Category {
            id,
            name: name.to_string(),
        });
    }

    pub async fn remove_user(&self, id: i64) {
        let mut tables = self.tables.write().await;
        tables.users.retain(|user| user.id != id);
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn expert_count(&self) -> usize {
        self.tables.read().await.experts.len()
    }

    pub async fn seller_info_count(&self) -> usize {
        self.tables.read().await.seller_infos.len()
    }

    pub async fn expert_for_user(&self, user_id: i64) -> Option<Expert> {
        self.tables
            .read()
            .await
            .experts
            .iter()
            .find(|expert| expert.user_id == user_id)
            .cloned()
    }

    pub async fn seller_info(&self, id: i64) -> Option<SellerInfo> {
        self.tables
            .read()
            .await
            .seller_infos
            .iter()
            .find(|info| info.id == id)
            .cloned()
    }

    /// Tag names attached to an expert, in attachment order.
    pub async fn hash_tags_for(&self, expert_id: i64) -> Vec<String> {
        let tables = self.tables.read().await;
        tables
            .expert_hash_tags
            .iter()
            .filter(|(owner, _)| *owner == expert_id)
            .filter_map(|(_, tag_id)| {
                tables
                    .hash_tags
                    .iter()
                    .find(|(id, _)| id == tag_id)
                    .map(|(_, name)| name.clone())
            })
            .collect()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<User>, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|user| user.identifier.as_deref() == Some(identifier))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables
            .users
            .iter()
            .find(|row| row.identifier.as_deref() == Some(user.identifier.as_str()))
        {
            return Ok(existing.clone());
        }

        tables.last_user_id += 1;
        let created = User {
            id: tables.last_user_id,
            email: user.email,
            image: user.image,
            identifier: Some(user.identifier),
        };
        tables.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ExpertRepository for MemoryStore {
    async fn category_exists(&self, id: i64) -> Result<bool, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().any(|category| category.id == id))
    }

    async fn position_exists(&self, id: i64) -> Result<bool, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables.positions.iter().any(|position| position.id == id))
    }

    async fn exists_for_user(&self, user_id: i64) -> Result<bool, ApiError> {
        let tables = self.tables.read().await;
        Ok(tables.experts.iter().any(|expert| expert.user_id == user_id))
    }

    async fn create(&self, expert: NewExpert) -> Result<Expert, ApiError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;

        // Same checks the schema's constraints perform, before anything is written
        if !tables.users.iter().any(|user| user.id == expert.user_id) {
            return Err(ApiError::InvalidUser(expert.user_id));
        }
        if tables.experts.iter().any(|row| row.user_id == expert.user_id) {
            return Err(ApiError::ExistsExpert(expert.user_id));
        }
        if !tables.categories.iter().any(|row| row.id == expert.category_id) {
            return Err(ApiError::InvalidCategory(expert.category_id));
        }
        if !tables.positions.iter().any(|row| row.id == expert.position_id) {
            return Err(ApiError::InvalidPosition(expert.position_id));
        }

        let hash_tags = expert.normalized_hash_tags();

        tables.last_seller_info_id += 1;
        let seller_info = SellerInfo {
            id: tables.last_seller_info_id,
            address: expert.seller_info.address,
            phone_number: expert.seller_info.phone_number,
            email: expert.seller_info.email,
        };

        tables.last_expert_id += 1;
        let created = Expert {
            id: tables.last_expert_id,
            user_id: expert.user_id,
            position_id: expert.position_id,
            category_id: expert.category_id,
            seller_info_id: seller_info.id,
            introduction: expert.introduction,
            image: expert.image,
            name: expert.name,
        };

        for tag in hash_tags {
            let existing = tables
                .hash_tags
                .iter()
                .find(|(_, name)| *name == tag)
                .map(|(id, _)| *id);
            let tag_id = match existing {
                Some(id) => id,
                None => {
                    tables.last_hash_tag_id += 1;
                    let id = tables.last_hash_tag_id;
                    tables.hash_tags.push((id, tag));
                    id
                }
            };
            tables.expert_hash_tags.push((created.id, tag_id));
        }

        tables.seller_infos.push(seller_info);
        tables.experts.push(created.clone());
        Ok(created)
    }
}
