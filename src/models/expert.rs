use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Column widths in `seller_infos`, `experts` and `hash_tags`
pub const MAX_ADDRESS_LENGTH: usize = 200;
pub const MAX_PHONE_NUMBER_LENGTH: usize = 50;
pub const MAX_SELLER_EMAIL_LENGTH: usize = 200;
pub const MAX_EXPERT_IMAGE_LENGTH: usize = 2000;
pub const MAX_EXPERT_NAME_LENGTH: usize = 100;
pub const MAX_HASH_TAG_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Position {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Seller contact details, owned by exactly one expert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SellerInfo {
    pub id: i64,
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

/// Expert listing. At most one per user (`experts.user_id` is unique).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Expert {
    pub id: i64,
    pub user_id: i64,
    pub position_id: i64,
    pub category_id: i64,
    pub seller_info_id: i64,
    pub introduction: String,
    pub image: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSellerInfo {
    pub address: String,
    pub phone_number: String,
    pub email: String,
}

/// Everything needed to create an expert, its seller info and its hash tags in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpert {
    pub user_id: i64,
    pub position_id: i64,
    pub category_id: i64,
    pub introduction: String,
    pub image: String,
    pub name: String,
    pub seller_info: NewSellerInfo,
    pub hash_tags: Vec<String>,
}

impl NewExpert {
    /// Trimmed, non-empty tags in first-seen order without duplicates.
    pub fn normalized_hash_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::with_capacity(self.hash_tags.len());
        for tag in &self.hash_tags {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|seen| seen == tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }
}
