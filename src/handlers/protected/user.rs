use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::{password::hash_password, Identity};
use crate::database::models::{User, UserPatch};
use crate::handlers::validation::{Validator, PASSWORD_LEN};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// GET /api/v1/user
pub async fn show(identity: Identity, State(state): State<AppState>) -> ApiResult<User> {
    let caller = identity.require()?;
    let user = state.users.get_by_id(caller.id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT|PATCH /api/v1/user - change email and/or password
pub async fn update(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let caller = identity.require()?;
    let Json(request) = payload?;

    let mut validator = Validator::new();
    if let Some(email) = request.email.as_deref() {
        validator.email("email", email);
    }
    validator
        .optional_length("password", request.password.as_deref(), PASSWORD_LEN)
        .finish()?;

    let password_hash = match request.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let user = state.users.get_by_id(caller.id).await?;
    let user = state
        .users
        .update(&user, UserPatch { email: request.email, password_hash })
        .await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/user - remove the account and everything it owns
pub async fn remove(identity: Identity, State(state): State<AppState>) -> ApiResult<()> {
    let caller = identity.require()?;
    state.users.delete(caller.id).await?;
    tracing::info!(user_id = caller.id, "user deleted");
    Ok(ApiResponse::no_content())
}
