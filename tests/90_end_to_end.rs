mod common;

use anyhow::{Context, Result};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use posterify_api::app;

async fn signup(app: &axum::Router, email: &str) -> Result<String> {
    let (status, body) = common::send(
        app,
        Method::POST,
        "/api/v1/auth/signup",
        None,
        Some(json!({ "email": email, "password": "correct-horse" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    assert!(body["data"]["user"].get("password_hash").is_none());
    body["data"]["token"].as_str().map(str::to_string).context("signup returned no token")
}

fn id_of(body: &Value) -> Result<i64> {
    body["data"]["id"].as_i64().context("response has no data.id")
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn alice_owns_her_collections_and_bob_cannot_touch_them() -> Result<()> {
    let pool = common::test_pool().await?;
    let app = app::router(common::state_with_pool(pool)?);

    for uri in ["/health", "/api/v1/health"] {
        let (status, body) = common::send(&app, Method::GET, uri, None, None).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
    }

    let alice_email = common::unique_email("alice");
    let alice = signup(&app, &alice_email).await?;
    let bob = signup(&app, &common::unique_email("bob")).await?;

    // Duplicate signup
    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/auth/signup",
        None,
        Some(json!({ "email": alice_email, "password": "correct-horse" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "email is already in use");

    // Login
    let (status, _) = common::send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": alice_email, "password": "wrong-horse" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": alice_email, "password": "correct-horse" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());

    // Alice creates a collection and saves a poster
    let name = common::unique_name("Favorites");
    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/collections",
        Some(&alice),
        Some(json!({ "name": name, "description": "Noir classics" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = id_of(&body)?;

    let (status, body) = common::send(
        &app,
        Method::POST,
        &format!("/api/v1/collections/{}/images", id),
        Some(&alice),
        Some(json!({ "imgPath": "poster-a.jpg" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["images"][0]["image"], "poster-a.jpg");

    let (status, _) = common::send(
        &app,
        Method::POST,
        &format!("/api/v1/collections/{}/images", id),
        Some(&alice),
        Some(json!({ "imgPath": "poster-a.jpg" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // Bob is kept out
    let uri = format!("/api/v1/collections/{}", id);
    let (status, _) = common::send(&app, Method::GET, &uri, Some(&bob), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = common::send(&app, Method::DELETE, &uri, Some(&bob), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = common::send(
        &app,
        Method::PATCH,
        &uri,
        Some(&bob),
        Some(json!({ "name": "Hijacked" })),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = common::send(&app, Method::GET, "/api/v1/collections", Some(&bob), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["collections"], json!([]));

    // Alice lists her own collections by author id, detaches, deletes
    let (status, body) = common::send(&app, Method::GET, "/api/v1/user", Some(&alice), None).await?;
    assert_eq!(status, StatusCode::OK);
    let alice_id = id_of(&body)?;

    let (status, body) = common::send(
        &app,
        Method::GET,
        &format!("/api/v1/collections?author={}", alice_id),
        Some(&alice),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"]["collections"].as_array().context("collections is not an array")?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], id);
    assert_eq!(listed[0]["name"], name.as_str());
    assert_eq!(listed[0]["author"], alice_id);
    let images = listed[0]["images"].as_array().context("images is not an array")?;
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["image"], "poster-a.jpg");
    assert_eq!(images[0]["collectionId"], id);

    // Oversized page requests report the limit actually applied
    let max_limit = common::test_config("postgres://unused").filter.max_limit.context("no max limit")?;
    let (status, body) = common::send(
        &app,
        Method::GET,
        &format!("/api/v1/collections?author={}&limit={}", alice_id, max_limit + 1),
        Some(&alice),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["limit"], max_limit);
    assert_eq!(body["data"]["collections"].as_array().map(Vec::len), Some(1));

    let (status, body) = common::send(
        &app,
        Method::DELETE,
        &format!("/api/v1/collections/{}/images/poster-a.jpg", id),
        Some(&alice),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["images"], json!([]));

    let (status, _) = common::send(
        &app,
        Method::DELETE,
        &format!("/api/v1/collections/{}/images/poster-a.jpg", id),
        Some(&alice),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = common::send(&app, Method::DELETE, &uri, Some(&alice), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id_of(&body)?, id);

    let (status, _) = common::send(&app, Method::GET, &uri, Some(&alice), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Account removal
    let (status, _) = common::send(&app, Method::DELETE, "/api/v1/user", Some(&bob), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = common::send(&app, Method::GET, "/api/v1/user", Some(&bob), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn token_of_a_deleted_account_cannot_create_collections() -> Result<()> {
    let pool = common::test_pool().await?;
    let app = app::router(common::state_with_pool(pool)?);
    let token = signup(&app, &common::unique_email("gone")).await?;

    let (status, _) = common::send(&app, Method::DELETE, "/api/v1/user", Some(&token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/collections",
        Some(&token),
        Some(json!({ "name": common::unique_name("Orphans") })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND, "unexpected body: {}", body);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = common::send(
        &app,
        Method::PUT,
        "/api/v1/user",
        Some(&token),
        Some(json!({ "email": common::unique_email("gone") })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
