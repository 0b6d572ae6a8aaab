// Postgres repository integration tests
// Exercises the constraint-backed invariants of the sqlx repositories.
// Requires a PostgreSQL database at TEST_DATABASE_URL; skipped otherwise.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use expert_api::database::{
    run_migrations, setup_database, ExpertRepository, PgExpertRepository, PgUserRepository,
    UserRepository,
};
use expert_api::error::ApiError;
use expert_api::models::{
    NewExpert, NewSellerInfo, NewUser, MAX_ADDRESS_LENGTH, MAX_HASH_TAG_LENGTH,
};

// BIGSERIAL ids start at 1, so this never references a real row
const MISSING_ID: i64 = -1;

struct Fixture {
    pool: PgPool,
    users: PgUserRepository,
    experts: PgExpertRepository,
    position_id: i64,
    category_id: i64,
}

/// Connect, migrate and seed one position and one category.
async fn setup() -> Result<Option<Fixture>> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            println!("Skipping test: TEST_DATABASE_URL not set");
            return Ok(None);
        }
    };

    let pool = setup_database(&database_url, 5).await?;
    run_migrations(&pool).await?;

    let position_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO positions (name) VALUES ($1) RETURNING id",
    )
    .bind("Front")
    .fetch_one(&pool)
    .await?;

    let category_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO categories (name) VALUES ($1) RETURNING id",
    )
    .bind("Design")
    .fetch_one(&pool)
    .await?;

    Ok(Some(Fixture {
        users: PgUserRepository::new(pool.clone()),
        experts: PgExpertRepository::new(pool.clone()),
        pool,
        position_id,
        category_id,
    }))
}

fn new_user() -> NewUser {
    let identifier = Uuid::new_v4().to_string();
    NewUser {
        email: format!("{}@kakao.com", &identifier[..8]),
        image: "http://k.kakaocdn.net/img_640x640.jpg".to_string(),
        identifier,
    }
}

impl Fixture {
    async fn create_user(&self) -> Result<i64> {
        Ok(self.users.create(new_user()).await?.id)
    }

    /// An expert whose seller address is unique to this call, for row counting.
    fn expert(&self, user_id: i64, hash_tags: Vec<String>) -> NewExpert {
        NewExpert {
            user_id,
            position_id: self.position_id,
            category_id: self.category_id,
            introduction: "ten years of product design".to_string(),
            image: "http://img".to_string(),
            name: "kim".to_string(),
            seller_info: NewSellerInfo {
                address: format!("seoul-{}", Uuid::new_v4()),
                phone_number: "010-0000-0000".to_string(),
                email: "seller@naver.com".to_string(),
            },
            hash_tags,
        }
    }

    async fn seller_rows(&self, address: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM seller_infos WHERE address = $1",
        )
        .bind(address)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn hash_tag_rows(&self, name: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM hash_tags WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn unique_tag() -> String {
    format!("tag-{}", &Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
async fn test_user_create_returns_existing_row_for_same_identifier() -> Result<()> {
    let Some(fx) = setup().await? else {
        return Ok(());
    };

    let user = new_user();
    let first = fx.users.create(user.clone()).await?;
    let second = fx.users.create(user.clone()).await?;
    assert_eq!(first, second);

    let found = fx.users.find_by_identifier(&user.identifier).await?;
    assert_eq!(found, vec![first.clone()]);
    assert_eq!(fx.users.find_by_id(first.id).await?, Some(first));
    assert_eq!(fx.users.find_by_id(MISSING_ID).await?, None);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_logins_share_one_user() -> Result<()> {
    let Some(fx) = setup().await? else {
        return Ok(());
    };

    let user = new_user();
    let (a, b) = tokio::join!(fx.users.create(user.clone()), fx.users.create(user.clone()));
    assert_eq!(a?, b?);
    assert_eq!(fx.users.find_by_identifier(&user.identifier).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_overlong_user_email_is_invalid_profile() -> Result<()> {
    let Some(fx) = setup().await? else {
        return Ok(());
    };

    let mut user = new_user();
    user.email = format!("{}@kakao.com", "e".repeat(200));
    let err = fx.users.create(user.clone()).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidProfile), "got {err:?}");
    assert!(fx.users.find_by_identifier(&user.identifier).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_create_expert_links_shared_hash_tags() -> Result<()> {
    let Some(fx) = setup().await? else {
        return Ok(());
    };

    assert!(fx.experts.category_exists(fx.category_id).await?);
    assert!(fx.experts.position_exists(fx.position_id).await?);
    assert!(!fx.experts.category_exists(MISSING_ID).await?);
    assert!(!fx.experts.position_exists(MISSING_ID).await?);

    let tag = unique_tag();
    let first_user = fx.create_user().await?;
    let second_user = fx.create_user().await?;
    assert!(!fx.experts.exists_for_user(first_user).await?);

    // Duplicates and padding collapse to one link
    let first = fx
        .experts
        .create(fx.expert(first_user, vec![tag.clone(), format!(" {tag} ")]))
        .await?;
    let second = fx.experts.create(fx.expert(second_user, vec![tag.clone()])).await?;

    assert!(fx.experts.exists_for_user(first_user).await?);
    assert_eq!(first.user_id, first_user);
    assert_ne!(first.seller_info_id, second.seller_info_id);
    assert_eq!(fx.hash_tag_rows(&tag).await?, 1);

    let links = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM expert_hash_tags eht
         JOIN hash_tags ht ON ht.id = eht.hash_tag_id
         WHERE ht.name = $1",
    )
    .bind(&tag)
    .fetch_one(&fx.pool)
    .await?;
    assert_eq!(links, 2);

    Ok(())
}

#[tokio::test]
async fn test_second_expert_for_user_is_exists_expert() -> Result<()> {
    let Some(fx) = setup().await? else {
        return Ok(());
    };

    let user_id = fx.create_user().await?;
    fx.experts.create(fx.expert(user_id, vec![])).await?;

    let duplicate = fx.expert(user_id, vec![unique_tag()]);
    let address = duplicate.seller_info.address.clone();
    let tag = duplicate.hash_tags[0].clone();

    let err = fx.experts.create(duplicate).await.unwrap_err();
    assert!(matches!(err, ApiError::ExistsExpert(id) if id == user_id), "got {err:?}");
    assert_eq!(fx.seller_rows(&address).await?, 0);
    assert_eq!(fx.hash_tag_rows(&tag).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_registrations_yield_one_expert() -> Result<()> {
    let Some(fx) = setup().await? else {
        return Ok(());
    };

    let user_id = fx.create_user().await?;
    let a = fx.expert(user_id, vec![]);
    let b = fx.expert(user_id, vec![]);
    let addresses = [a.seller_info.address.clone(), b.seller_info.address.clone()];

    let (ra, rb) = tokio::join!(fx.experts.create(a), fx.experts.create(b));
    let (ok, err) = match (ra, rb) {
        (Ok(expert), Err(err)) | (Err(err), Ok(expert)) => (expert, err),
        (ra, rb) => panic!("expected exactly one success, got {ra:?} and {rb:?}"),
    };

    assert_eq!(ok.user_id, user_id);
    assert!(matches!(err, ApiError::ExistsExpert(id) if id == user_id), "got {err:?}");

    let experts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM experts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&fx.pool)
        .await?;
    assert_eq!(experts, 1);

    // Only the winner's seller info survives
    let mut seller_rows = 0;
    for address in &addresses {
        seller_rows += fx.seller_rows(address).await?;
    }
    assert_eq!(seller_rows, 1);

    Ok(())
}

#[tokio::test]
async fn test_dangling_references_are_mapped_and_rolled_back() -> Result<()> {
    let Some(fx) = setup().await? else {
        return Ok(());
    };

    let user_id = fx.create_user().await?;

    let mut expert = fx.expert(user_id, vec![]);
    expert.category_id = MISSING_ID;
    let address = expert.seller_info.address.clone();
    let err = fx.experts.create(expert).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidCategory(MISSING_ID)), "got {err:?}");
    assert_eq!(fx.seller_rows(&address).await?, 0);

    let mut expert = fx.expert(user_id, vec![]);
    expert.position_id = MISSING_ID;
    let address = expert.seller_info.address.clone();
    let err = fx.experts.create(expert).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidPosition(MISSING_ID)), "got {err:?}");
    assert_eq!(fx.seller_rows(&address).await?, 0);

    let expert = fx.expert(MISSING_ID, vec![]);
    let address = expert.seller_info.address.clone();
    let err = fx.experts.create(expert).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidUser(MISSING_ID)), "got {err:?}");
    assert_eq!(fx.seller_rows(&address).await?, 0);

    assert!(!fx.experts.exists_for_user(user_id).await?);

    Ok(())
}

#[tokio::test]
async fn test_overlong_values_are_invalid_value_without_partial_writes() -> Result<()> {
    let Some(fx) = setup().await? else {
        return Ok(());
    };

    let user_id = fx.create_user().await?;

    // Fails on the first insert
    let mut expert = fx.expert(user_id, vec![]);
    expert.seller_info.address = format!("{}-{}", Uuid::new_v4(), "a".repeat(MAX_ADDRESS_LENGTH));
    let address = expert.seller_info.address.clone();
    let err = fx.experts.create(expert).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidValue(_)), "got {err:?}");
    assert_eq!(fx.seller_rows(&address).await?, 0);

    // Fails after the seller info and expert rows were written
    let long_tag = format!("{}{}", unique_tag(), "t".repeat(MAX_HASH_TAG_LENGTH));
    let expert = fx.expert(user_id, vec![unique_tag(), long_tag]);
    let address = expert.seller_info.address.clone();
    let short_tag = expert.hash_tags[0].clone();
    let err = fx.experts.create(expert).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidValue(_)), "got {err:?}");
    assert_eq!(fx.seller_rows(&address).await?, 0);
    assert_eq!(fx.hash_tag_rows(&short_tag).await?, 0);
    assert!(!fx.experts.exists_for_user(user_id).await?);

    Ok(())
}
