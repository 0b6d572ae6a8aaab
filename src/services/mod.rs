// Outbound integrations

pub mod kakao;

pub use kakao::{IdentityProvider, KakaoClient, ProviderProfile};
