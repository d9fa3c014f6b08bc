use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::filter::FilterData;

/// A named, user-owned set of image references.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    #[serde(rename = "author")]
    pub author_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[sqlx(skip)]
    pub images: Vec<Image>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[sqlx(rename = "img_path")]
    #[serde(rename = "image")]
    pub path: String,
    pub collection_id: i64,
    #[sqlx(rename = "created_at")]
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCollection {
    pub author_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub poster: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub poster: Option<String>,
}

impl Collection {
    pub fn has_image(&self, path: &str) -> bool {
        self.images.iter().any(|image| image.path == path)
    }

    pub fn apply(&mut self, patch: CollectionPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(poster) = patch.poster {
            self.poster = Some(poster);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    pub id: Option<i64>,
    pub author_id: Option<i64>,
    pub name: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl From<&CollectionFilter> for FilterData {
    fn from(filter: &CollectionFilter) -> Self {
        FilterData::default()
            .eq("id", filter.id)
            .eq("author_id", filter.author_id)
            .eq("name", filter.name.clone())
            .limit(filter.limit)
            .offset(filter.offset)
    }
}
