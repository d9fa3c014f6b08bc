use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;
use serde::Deserialize;

use crate::auth::Identity;
use crate::database::models::Collection;
use crate::handlers::validation::{Validator, PATH_LEN};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AttachImageRequest {
    #[serde(rename = "imgPath")]
    pub img_path: String,
}

/// POST /api/v1/collections/:id/images
pub async fn attach(
    identity: Identity,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AttachImageRequest>, JsonRejection>,
) -> ApiResult<Collection> {
    identity.require()?;
    let Path(id) = id?;
    let Json(request) = payload?;

    Validator::new().length("imgPath", &request.img_path, PATH_LEN).finish()?;

    let collection = state.collections.get_owned(&identity, id).await?;
    let collection = state.collections.attach_image(collection.id, &request.img_path).await?;
    Ok(ApiResponse::success(collection))
}

/// DELETE /api/v1/collections/:id/images/*path
///
/// The wildcard is taken verbatim (percent-decoded), so a stored path that starts
/// with `/` is addressed as `.../images//posters/a.jpg`.
pub async fn detach(
    identity: Identity,
    State(state): State<AppState>,
    params: Result<Path<(i64, String)>, PathRejection>,
) -> ApiResult<Collection> {
    identity.require()?;
    let Path((id, path)) = params?;

    Validator::new().length("path", &path, PATH_LEN).finish()?;

    let collection = state.collections.get_owned(&identity, id).await?;
    let collection = state.collections.detach_image(collection.id, &path).await?;
    Ok(ApiResponse::success(collection))
}
