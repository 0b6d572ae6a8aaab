// Expert registration behind a session token

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use expert_api::auth::JwtService;
use expert_api::database::ExpertRepository;
use expert_api::models::{NewExpert, NewSellerInfo};

use common::{spawn_app, user, TestApp, JWT_SECRET};

const EXPERT: &str = "/users/expert";

/// User 1 has no expert; user 2 already has one.
async fn seeded_app() -> Result<TestApp> {
    let app = spawn_app().await?;
    app.store.insert_user(user(1, "ttb@naver.com", None)).await;
    app.store.insert_user(user(2, "gaya@naver.com", None)).await;
    app.store.insert_position(1, "Front").await;
    app.store.insert_category(1, "c").await;

    ExpertRepository::create(
        app.store.as_ref(),
        NewExpert {
            user_id: 2,
            position_id: 1,
            category_id: 1,
            introduction: "hello".to_string(),
            image: "http://".to_string(),
            name: "kim".to_string(),
            seller_info: NewSellerInfo {
                address: "dd".to_string(),
                phone_number: "dd".to_string(),
                email: "g@naver.com".to_string(),
            },
            hash_tags: vec![],
        },
    )
    .await?;

    Ok(app)
}

fn expert_body() -> Value {
    json!({
        "introduction": "dd",
        "image": "dd",
        "name": "dd",
        "category_id": 1,
        "hash_tag": ["d", "f", "s"],
        "seller_info": {
            "address": "ff",
            "phone_number": "dd",
            "email": "ss"
        },
        "position_id": 1
    })
}

async fn post_expert(app: &TestApp, user_id: i64, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let token = app.jwt.issue_token(user_id)?;
    app.post(EXPERT, Some(token.as_str()), body.map(|b| b.to_string()))
        .await
}

#[tokio::test]
async fn test_register_expert_success() -> Result<()> {
    let app = seeded_app().await?;

    let (status, body) = post_expert(&app, 1, Some(expert_body())).await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "SUCCESS" }));
    assert_eq!(app.store.expert_count().await, 2);
    assert_eq!(app.store.seller_info_count().await, 2);

    let expert = app.store.expert_for_user(1).await.unwrap();
    assert_eq!(expert.category_id, 1);
    assert_eq!(expert.position_id, 1);
    assert_eq!(expert.name, "dd");
    assert_eq!(app.store.hash_tags_for(expert.id).await, vec!["d", "f", "s"]);

    let seller = app.store.seller_info(expert.seller_info_id).await.unwrap();
    assert_eq!(seller.address, "ff");
    assert_eq!(seller.email, "ss");

    Ok(())
}

#[tokio::test]
async fn test_bearer_prefixed_session_token_accepted() -> Result<()> {
    let app = seeded_app().await?;
    let token = app.jwt.issue_token(1)?;

    let (status, _) = app
        .post(EXPERT, Some(format!("Bearer {}", token).as_str()), Some(expert_body().to_string()))
        .await?;

    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn test_missing_keys_are_key_error() -> Result<()> {
    let app = seeded_app().await?;
    let mut body = expert_body();
    body.as_object_mut().unwrap().remove("image");
    body.as_object_mut().unwrap().remove("category_id");

    let (status, response) = post_expert(&app, 1, Some(body)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "KEY_ERROR" }));
    assert_eq!(app.store.expert_count().await, 1);
    assert_eq!(app.store.seller_info_count().await, 1);
    assert!(app.store.expert_for_user(1).await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_missing_nested_seller_key_is_key_error() -> Result<()> {
    let app = seeded_app().await?;
    let mut body = expert_body();
    body["seller_info"].as_object_mut().unwrap().remove("phone_number");

    let (status, response) = post_expert(&app, 1, Some(body)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "KEY_ERROR" }));
    assert!(app.store.expert_for_user(1).await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_missing_body_is_invalid_value() -> Result<()> {
    let app = seeded_app().await?;

    let (status, response) = post_expert(&app, 1, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_VALUE" }));

    let token = app.jwt.issue_token(1)?;
    let (status, response) = app
        .post(EXPERT, Some(token.as_str()), Some("{not json".to_string()))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_VALUE" }));

    assert!(app.store.expert_for_user(1).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_wrong_types_and_empty_values_are_invalid_value() -> Result<()> {
    let app = seeded_app().await?;

    let mut body = expert_body();
    body["category_id"] = json!("1");
    let (status, response) = post_expert(&app, 1, Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_VALUE" }));

    let mut body = expert_body();
    body["name"] = json!("");
    let (status, response) = post_expert(&app, 1, Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_VALUE" }));

    assert!(app.store.expert_for_user(1).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_blank_and_overlong_values_are_invalid_value() -> Result<()> {
    let app = seeded_app().await?;

    let mut body = expert_body();
    body["name"] = json!("   ");
    let (status, response) = post_expert(&app, 1, Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_VALUE" }));

    // Wider than seller_infos.address / seller_infos.email
    let mut body = expert_body();
    body["seller_info"]["address"] = json!("a".repeat(230));
    let (status, response) = post_expert(&app, 1, Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_VALUE" }));

    let mut body = expert_body();
    body["seller_info"]["email"] = json!(format!("{}@naver.com", "s".repeat(230)));
    let (status, response) = post_expert(&app, 1, Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_VALUE" }));

    assert!(app.store.expert_for_user(1).await.is_none());
    assert_eq!(app.store.seller_info_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_category_is_invalid_category() -> Result<()> {
    let app = seeded_app().await?;
    let mut body = expert_body();
    body["category_id"] = json!(4);

    let (status, response) = post_expert(&app, 1, Some(body)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_CATEGORY" }));
    assert_eq!(app.store.expert_count().await, 1);
    assert_eq!(app.store.seller_info_count().await, 1);

    Ok(())
}

#[tokio::test]
async fn test_unknown_position_is_invalid_position() -> Result<()> {
    let app = seeded_app().await?;
    let mut body = expert_body();
    body["position_id"] = json!(99);

    let (status, response) = post_expert(&app, 1, Some(body)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "INVALID_POSITION" }));
    assert_eq!(app.store.expert_count().await, 1);
    assert_eq!(app.store.seller_info_count().await, 1);

    Ok(())
}

#[tokio::test]
async fn test_second_registration_is_exists_expert() -> Result<()> {
    let app = seeded_app().await?;
    let before = app.store.expert_for_user(2).await.unwrap();

    let mut body = expert_body();
    body["hash_tag"] = json!(["d"]);
    let (status, response) = post_expert(&app, 2, Some(body)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "message": "EXISTS_EXPERT" }));
    assert_eq!(app.store.expert_count().await, 1);
    assert_eq!(app.store.seller_info_count().await, 1);
    assert_eq!(app.store.expert_for_user(2).await, Some(before));

    Ok(())
}

#[tokio::test]
async fn test_missing_or_forged_session_token_is_invalid_token() -> Result<()> {
    let app = seeded_app().await?;

    let (status, response) = app
        .post(EXPERT, None, Some(expert_body().to_string()))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response, json!({ "message": "INVALID_TOKEN" }));

    let forged = JwtService::new("not-the-secret", 3600).issue_token(1)?;
    let (status, response) = app
        .post(EXPERT, Some(forged.as_str()), Some(expert_body().to_string()))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response, json!({ "message": "INVALID_TOKEN" }));

    let expired = JwtService::new(JWT_SECRET, -3600).issue_token(1)?;
    let (status, response) = app
        .post(EXPERT, Some(expired.as_str()), Some(expert_body().to_string()))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response, json!({ "message": "INVALID_TOKEN" }));

    assert!(app.store.expert_for_user(1).await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_token_for_deleted_user_is_invalid_user() -> Result<()> {
    let app = seeded_app().await?;
    let token = app.jwt.issue_token(1)?;
    app.store.remove_user(1).await;

    let (status, response) = app
        .post(EXPERT, Some(token.as_str()), Some(expert_body().to_string()))
        .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response, json!({ "message": "INVALID_USER" }));
    assert_eq!(app.store.expert_count().await, 1);

    Ok(())
}

#[tokio::test]
async fn test_health_and_openapi() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["storage"], "memory");

    let (status, body) = app.get("/api/docs/openapi.json").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/users/expert"]["post"].is_object());

    // No recorder is installed in tests
    let (status, _) = app.get("/metrics").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
