mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use posterify_api::auth::CredentialCodec;

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let app = common::lazy_router()?;

    for (method, uri) in [
        (Method::GET, "/api/v1/user"),
        (Method::GET, "/api/v1/collections"),
        (Method::GET, "/api/v1/collections/1"),
        (Method::DELETE, "/api/v1/collections/1"),
        (Method::DELETE, "/api/v1/collections/1/images/poster.jpg"),
    ] {
        let (status, body) = common::send(&app, method.clone(), uri, None, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_token_is_rejected() -> Result<()> {
    let app = common::lazy_router()?;
    let (status, _) = common::send(&app, Method::GET, "/api/v1/user", Some("not.a.jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() -> Result<()> {
    let app = common::lazy_router()?;
    let foreign = CredentialCodec::new("some-other-secret", 1)?.issue(1, "alice@example.com")?;

    let (status, _) = common::send(&app, Method::GET, "/api/v1/collections", Some(&foreign), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_with_non_hmac_header_is_rejected() -> Result<()> {
    let app = common::lazy_router()?;
    let token = CredentialCodec::new(common::TEST_SECRET, 1)?.issue(1, "alice@example.com")?;
    let (_, rest) = token.split_once('.').expect("jwt has segments");
    // {"alg":"RS256","typ":"JWT"}
    let forged = format!("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}", rest);

    let (status, _) = common::send(&app, Method::GET, "/api/v1/user", Some(&forged), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn signup_validates_before_touching_the_database() -> Result<()> {
    let app = common::lazy_router()?;

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/auth/signup",
        None,
        Some(json!({ "email": "not-an-email", "password": "short" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"].get("email").is_some());
    assert!(body["field_errors"].get("password").is_some());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let app = common::lazy_router()?;
    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": 42 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn invalid_collection_name_is_rejected_for_authenticated_caller() -> Result<()> {
    let app = common::lazy_router()?;
    let token = CredentialCodec::new(common::TEST_SECRET, 1)?.issue(1, "alice@example.com")?;

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/api/v1/collections",
        Some(&token),
        Some(json!({ "name": "ab" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"].get("name").is_some());
    Ok(())
}

#[tokio::test]
async fn non_numeric_collection_id_is_a_bad_request() -> Result<()> {
    let app = common::lazy_router()?;
    let token = CredentialCodec::new(common::TEST_SECRET, 1)?.issue(1, "alice@example.com")?;

    let (status, _) =
        common::send(&app, Method::GET, "/api/v1/collections/abc", Some(&token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
