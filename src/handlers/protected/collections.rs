use axum::extract::{
    rejection::{JsonRejection, PathRejection, QueryRejection},
    Path, Query, State,
};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::database::models::{Collection, CollectionFilter, CollectionPatch, NewCollection};
use crate::filter::capped_limit;
use crate::handlers::validation::{Validator, COLLECTION_NAME_LEN, DESCRIPTION_LEN, PATH_LEN};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
    pub poster: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCollectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub poster: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub author: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CollectionList {
    pub collections: Vec<Collection>,
    pub limit: u32,
    pub offset: u32,
}

impl From<&ListQuery> for CollectionFilter {
    fn from(query: &ListQuery) -> Self {
        CollectionFilter {
            id: query.id,
            author_id: query.author,
            name: query.name.clone(),
            limit: query.limit.unwrap_or(0),
            offset: query.offset.unwrap_or(0),
        }
    }
}

/// POST /api/v1/collections
pub async fn create(
    identity: Identity,
    State(state): State<AppState>,
    payload: Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> ApiResult<Collection> {
    let caller = identity.require()?;
    let Json(request) = payload?;

    Validator::new()
        .length("name", &request.name, COLLECTION_NAME_LEN)
        .optional_length("description", request.description.as_deref(), DESCRIPTION_LEN)
        .optional_length("poster", request.poster.as_deref(), PATH_LEN)
        .finish()?;

    let collection = state
        .collections
        .create(NewCollection {
            author_id: caller.id,
            name: request.name,
            description: request.description,
            poster: request.poster,
        })
        .await?;
    Ok(ApiResponse::created(collection))
}

/// GET /api/v1/collections - the caller's own collections
pub async fn list(
    identity: Identity,
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<CollectionList> {
    identity.require()?;
    let Query(query) = query?;

    let filter = CollectionFilter::from(&query);
    let limit = capped_limit(filter.limit, state.config.filter.max_limit);
    let offset = filter.offset;
    let collections = state.collections.list_owned(&identity, filter).await?;

    Ok(ApiResponse::success(CollectionList { collections, limit, offset }))
}

/// GET /api/v1/collections/:id
pub async fn show(
    identity: Identity,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Collection> {
    identity.require()?;
    let Path(id) = id?;

    let collection = state.collections.get_owned(&identity, id).await?;
    Ok(ApiResponse::success(collection))
}

/// PUT|PATCH /api/v1/collections/:id - only the supplied fields change
pub async fn update(
    identity: Identity,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateCollectionRequest>, JsonRejection>,
) -> ApiResult<Collection> {
    identity.require()?;
    let Path(id) = id?;
    let Json(request) = payload?;

    Validator::new()
        .optional_length("name", request.name.as_deref(), COLLECTION_NAME_LEN)
        .optional_length("description", request.description.as_deref(), DESCRIPTION_LEN)
        .optional_length("poster", request.poster.as_deref(), PATH_LEN)
        .finish()?;

    let collection = state.collections.get_owned(&identity, id).await?;
    let patch = CollectionPatch {
        name: request.name,
        description: request.description,
        poster: request.poster,
    };
    let collection = state.collections.update(&collection, patch).await?;
    Ok(ApiResponse::success(collection))
}

/// DELETE /api/v1/collections/:id - responds with the deleted collection
pub async fn remove(
    identity: Identity,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Collection> {
    identity.require()?;
    let Path(id) = id?;

    let collection = state.collections.get_owned(&identity, id).await?;
    state.collections.delete(collection.id).await?;
    Ok(ApiResponse::success(collection))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_maps_onto_filter() {
        let query = ListQuery { author: Some(4), limit: Some(10), ..Default::default() };
        let filter = CollectionFilter::from(&query);
        assert_eq!(filter.author_id, Some(4));
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.offset, 0);
        assert!(filter.id.is_none());
    }
}
