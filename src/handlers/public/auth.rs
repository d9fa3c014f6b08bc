// handlers/public/auth.rs - POST /api/v1/auth/signup, POST /api/v1/auth/login

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::password::hash_password;
use crate::database::models::{NewUser, User};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::validation::{Validator, PASSWORD_LEN};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// POST /api/v1/auth/signup - register and receive a token
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(credentials) = payload?;
    Validator::new()
        .email("email", &credentials.email)
        .length("password", &credentials.password, PASSWORD_LEN)
        .finish()?;

    let password_hash = hash_password(&credentials.password)?;
    let user = state
        .users
        .create(NewUser {
            email: credentials.email,
            password_hash,
        })
        .await?;
    let token = state.codec.issue(user.id, &user.email)?;

    tracing::info!(user_id = user.id, "user signed up");
    Ok(ApiResponse::created(Session { user, token }))
}

/// POST /api/v1/auth/login - exchange email and password for a token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Session> {
    let Json(credentials) = payload?;
    Validator::new()
        .length("email", &credentials.email, (1, 254))
        .length("password", &credentials.password, (1, PASSWORD_LEN.1))
        .finish()?;

    let user = state
        .users
        .authenticate(&credentials.email, &credentials.password)
        .await
        .map_err(|e| match e {
            DatabaseError::Unauthorized(msg) => ApiError::unauthorized(msg),
            other => other.into(),
        })?;
    let token = state.codec.issue(user.id, &user.email)?;

    Ok(ApiResponse::success(Session { user, token }))
}
