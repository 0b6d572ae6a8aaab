use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{NewExpert, NewSellerInfo, MAX_HASH_TAG_LENGTH};

pub const SUCCESS: &str = "SUCCESS";

const MAX_HASH_TAGS: usize = 20;

/// Plain success body: `{"message": "SUCCESS"}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "SUCCESS")]
    pub message: String,
}

impl MessageResponse {
    pub fn success() -> Self {
        Self {
            message: SUCCESS.to_string(),
        }
    }
}

/// Social login response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SocialLoginResponse {
    #[schema(example = "SUCCESS")]
    pub message: String,
    /// Session token for `Authorization` on protected routes
    pub access_token: String,
    /// Profile image URL reported by the provider
    #[schema(example = "http://yyy.kakao.com/img_640x640.jpg")]
    pub profile: String,
}

/// Seller contact details nested in an expert registration
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct SellerInfoRequest {
    // Length limits mirror the column widths in `models::expert`
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    #[schema(example = "Seoul, Gangnam-gu")]
    pub address: Option<String>,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    #[schema(example = "010-1234-5678")]
    pub phone_number: Option<String>,

    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    #[schema(example = "seller@naver.com")]
    pub email: Option<String>,
}

/// Expert registration request.
///
/// Every field is required. They are modelled as `Option` so that a missing
/// key (`KEY_ERROR`) can be told apart from a malformed value (`INVALID_VALUE`).
#[derive(Debug, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct ExpertRequest {
    #[validate(length(min = 1, max = 2000), custom(function = "not_blank"))]
    pub introduction: Option<String>,

    #[validate(length(min = 1, max = 2000), custom(function = "not_blank"))]
    #[schema(example = "http://image.example.com/expert.jpg")]
    pub image: Option<String>,

    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,

    #[schema(example = 1)]
    pub category_id: Option<i64>,

    #[validate(custom(function = "validate_hash_tags"))]
    #[schema(example = json!(["rust", "backend"]))]
    pub hash_tag: Option<Vec<String>>,

    #[validate(nested)]
    pub seller_info: Option<SellerInfoRequest>,

    #[schema(example = 1)]
    pub position_id: Option<i64>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_hash_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.len() > MAX_HASH_TAGS {
        return Err(ValidationError::new("too_many_hash_tags"));
    }
    if tags.iter().any(|tag| tag.chars().count() > MAX_HASH_TAG_LENGTH) {
        return Err(ValidationError::new("hash_tag_too_long"));
    }
    Ok(())
}

impl ExpertRequest {
    /// Dotted paths of required keys absent from the body, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.introduction.is_none() {
            missing.push("introduction");
        }
        if self.image.is_none() {
            missing.push("image");
        }
        if self.name.is_none() {
            missing.push("name");
        }
        if self.category_id.is_none() {
            missing.push("category_id");
        }
        if self.hash_tag.is_none() {
            missing.push("hash_tag");
        }
        match &self.seller_info {
            None => missing.push("seller_info"),
            Some(seller) => {
                if seller.address.is_none() {
                    missing.push("seller_info.address");
                }
                if seller.phone_number.is_none() {
                    missing.push("seller_info.phone_number");
                }
                if seller.email.is_none() {
                    missing.push("seller_info.email");
                }
            }
        }
        if self.position_id.is_none() {
            missing.push("position_id");
        }

        missing
    }

    /// Convert into the repository payload. Returns `None` if any required
    /// field is missing; callers check `missing_fields` first.
    pub fn into_new_expert(self, user_id: i64) -> Option<NewExpert> {
        let seller = self.seller_info?;

        Some(NewExpert {
            user_id,
            position_id: self.position_id?,
            category_id: self.category_id?,
            introduction: self.introduction?,
            image: self.image?,
            name: self.name?,
            seller_info: NewSellerInfo {
                address: seller.address?,
                phone_number: seller.phone_number?,
                email: seller.email?,
            },
            hash_tags: self.hash_tag?,
        })
    }
}
