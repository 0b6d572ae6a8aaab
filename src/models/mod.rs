// Data models and DTOs
// Database rows and the insert payloads the repositories accept.

pub mod expert;
pub mod user;

pub use expert::{
    Category, Expert, NewExpert, NewSellerInfo, Position, SellerInfo, MAX_ADDRESS_LENGTH,
    MAX_EXPERT_IMAGE_LENGTH, MAX_EXPERT_NAME_LENGTH, MAX_HASH_TAG_LENGTH,
    MAX_PHONE_NUMBER_LENGTH, MAX_SELLER_EMAIL_LENGTH,
};
pub use user::{
    NewUser, User, MAX_IDENTIFIER_LENGTH, MAX_USER_EMAIL_LENGTH, MAX_USER_IMAGE_LENGTH,
};
