mod common;

use anyhow::Result;

use posterify_api::auth::password::hash_password;
use posterify_api::config::{AppConfig, Environment};
use posterify_api::database::models::{NewUser, UserFilter, UserPatch};
use posterify_api::database::DatabaseError;
use posterify_api::services::UserService;

fn service(pool: sqlx::PgPool) -> UserService {
    UserService::new(pool, &AppConfig::for_environment(Environment::Development).filter)
}

async fn new_user(users: &UserService, password: &str) -> Result<posterify_api::database::models::User> {
    Ok(users
        .create(NewUser {
            email: common::unique_email("user"),
            password_hash: hash_password(password)?,
        })
        .await?)
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn duplicate_email_is_a_duplicate_key() -> Result<()> {
    let pool = common::test_pool().await?;
    let users = service(pool);

    let first = new_user(&users, "password123").await?;
    let err = users
        .create(NewUser {
            email: first.email.clone(),
            password_hash: hash_password("password456")?,
        })
        .await
        .unwrap_err();

    match err {
        DatabaseError::DuplicateKey(msg) => assert_eq!(msg, "email is already in use"),
        other => panic!("expected DuplicateKey, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn lookups_by_id_and_email() -> Result<()> {
    let pool = common::test_pool().await?;
    let users = service(pool);

    let user = new_user(&users, "password123").await?;
    assert_eq!(users.get_by_id(user.id).await?.email, user.email);
    assert_eq!(users.get_by_email(&user.email).await?.id, user.id);

    let listed = users
        .list(&UserFilter { email: Some(user.email.clone()), ..Default::default() })
        .await?;
    assert_eq!(listed.len(), 1);

    assert!(matches!(users.get_by_id(i64::MAX).await, Err(DatabaseError::NotFound(_))));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn authenticate_hides_which_part_was_wrong() -> Result<()> {
    let pool = common::test_pool().await?;
    let users = service(pool);

    let user = new_user(&users, "password123").await?;
    assert_eq!(users.authenticate(&user.email, "password123").await?.id, user.id);

    let wrong_password = users.authenticate(&user.email, "password124").await.unwrap_err();
    let unknown_email = users.authenticate(&common::unique_email("ghost"), "password123").await.unwrap_err();
    assert!(matches!(wrong_password, DatabaseError::Unauthorized(_)));
    assert!(matches!(unknown_email, DatabaseError::Unauthorized(_)));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn update_applies_present_fields_and_advances_timestamp() -> Result<()> {
    let pool = common::test_pool().await?;
    let users = service(pool);

    let user = new_user(&users, "password123").await?;
    let email = common::unique_email("renamed");
    let updated = users
        .update(&user, UserPatch { email: Some(email.clone()), password_hash: None })
        .await?;

    assert_eq!(updated.email, email);
    assert_eq!(updated.password_hash, user.password_hash);
    assert!(updated.updated_at > user.updated_at);

    let other = new_user(&users, "password123").await?;
    let err = users
        .update(&other, UserPatch { email: Some(email), password_hash: None })
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateKey(_)));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn delete_removes_the_row_once() -> Result<()> {
    let pool = common::test_pool().await?;
    let users = service(pool);

    let user = new_user(&users, "password123").await?;
    users.delete(user.id).await?;

    assert!(matches!(users.get_by_id(user.id).await, Err(DatabaseError::NotFound(_))));
    assert!(matches!(users.delete(user.id).await, Err(DatabaseError::NotFound(_))));
    Ok(())
}
