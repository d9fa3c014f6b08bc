use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::auth::{authorize, Identity};
use crate::config::FilterConfig;
use crate::database::models::{Collection, CollectionFilter, CollectionPatch, Image, NewCollection};
use crate::database::{DatabaseError, Repository};
use crate::filter::FilterData;

const NAME_TAKEN: &str = "collection name already used by this author";

/// Persistence for collections and their image membership.
///
/// Every operation runs in its own transaction. Membership changes lock the
/// parent row first and refresh its `updated_at` in the same transaction, so a
/// failed write leaves both the image set and the timestamp untouched.
#[derive(Clone)]
pub struct CollectionService {
    pool: PgPool,
    collections: Repository<Collection>,
}

impl CollectionService {
    pub fn new(pool: PgPool, filter_config: &FilterConfig) -> Self {
        Self {
            pool,
            collections: Repository::new("collections", filter_config),
        }
    }

    pub async fn create(&self, new_collection: NewCollection) -> Result<Collection, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let collection = sqlx::query_as::<_, Collection>(
            "INSERT INTO collections (author_id, name, description, poster) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(new_collection.author_id)
        .bind(&new_collection.name)
        .bind(&new_collection.description)
        .bind(&new_collection.poster)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            DatabaseError::from(e)
                .describe_duplicate(NAME_TAKEN)
                .describe_missing("user")
        })?;

        tx.commit().await?;
        debug!(collection_id = collection.id, author_id = collection.author_id, "collection created");
        Ok(collection)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Collection, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let filter = CollectionFilter { id: Some(id), ..Default::default() };
        let mut collection = self
            .collections
            .select_404(&mut *tx, FilterData::from(&filter), "collection")
            .await?;
        load_images(&mut tx, std::slice::from_mut(&mut collection)).await?;

        tx.commit().await?;
        Ok(collection)
    }

    pub async fn list(&self, filter: &CollectionFilter) -> Result<Vec<Collection>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut collections = self.collections.select_any(&mut *tx, FilterData::from(filter)).await?;
        load_images(&mut tx, &mut collections).await?;

        tx.commit().await?;
        Ok(collections)
    }

    /// Applies the present patch fields and saves. The caller's copy is untouched on failure.
    pub async fn update(&self, collection: &Collection, patch: CollectionPatch) -> Result<Collection, DatabaseError> {
        let mut next = collection.clone();
        next.apply(patch);

        let mut tx = self.pool.begin().await?;

        let updated_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE collections \
             SET name = $2, description = $3, poster = $4, \
                 updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond') \
             WHERE id = $1 \
             RETURNING updated_at",
        )
        .bind(next.id)
        .bind(&next.name)
        .bind(&next.description)
        .bind(&next.poster)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(e).describe_duplicate(NAME_TAKEN))?
        .ok_or_else(|| DatabaseError::NotFound(format!("collection {}", next.id)))?;

        tx.commit().await?;

        next.updated_at = updated_at;
        debug!(collection_id = next.id, "collection updated");
        Ok(next)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM collections_images WHERE collection_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("collection {}", id)));
        }

        tx.commit().await?;
        debug!(collection_id = id, "collection deleted");
        Ok(())
    }

    pub async fn attach_image(&self, collection_id: i64, path: &str) -> Result<Collection, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut collection = lock_collection(&mut tx, collection_id).await?;
        load_images(&mut tx, std::slice::from_mut(&mut collection)).await?;

        if collection.has_image(path) {
            return Err(DatabaseError::AlreadyAttached(path.to_string()));
        }

        let image = sqlx::query_as::<_, Image>(
            "INSERT INTO collections_images (img_path, collection_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(path)
        .bind(collection_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::DuplicateKey(_) => DatabaseError::AlreadyAttached(path.to_string()),
            other => other,
        })?;

        collection.updated_at = touch_collection(&mut tx, collection_id).await?;
        collection.images.push(image);

        tx.commit().await?;
        debug!(collection_id, path, "image attached");
        Ok(collection)
    }

    pub async fn detach_image(&self, collection_id: i64, path: &str) -> Result<Collection, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut collection = lock_collection(&mut tx, collection_id).await?;
        load_images(&mut tx, std::slice::from_mut(&mut collection)).await?;

        if !collection.has_image(path) {
            return Err(DatabaseError::NotAttached(path.to_string()));
        }

        sqlx::query("DELETE FROM collections_images WHERE collection_id = $1 AND img_path = $2")
            .bind(collection_id)
            .bind(path)
            .execute(&mut *tx)
            .await?;

        collection.updated_at = touch_collection(&mut tx, collection_id).await?;
        collection.images.retain(|image| image.path != path);

        tx.commit().await?;
        debug!(collection_id, path, "image detached");
        Ok(collection)
    }

    /// Loads a collection the identity owns. Missing is `NotFound`, foreign is `Unauthorized`.
    pub async fn get_owned(&self, identity: &Identity, id: i64) -> Result<Collection, DatabaseError> {
        if identity.is_anonymous() {
            return Err(DatabaseError::Unauthorized("anonymous identity".to_string()));
        }
        let collection = self.get_by_id(id).await?;
        authorize(identity, &collection)?;
        Ok(collection)
    }

    /// Lists the identity's own collections. Asking for another author's yields nothing.
    pub async fn list_owned(
        &self,
        identity: &Identity,
        mut filter: CollectionFilter,
    ) -> Result<Vec<Collection>, DatabaseError> {
        let Some(owner) = identity.user_id() else {
            return Err(DatabaseError::Unauthorized("anonymous identity".to_string()));
        };
        if filter.author_id.is_some_and(|author| author != owner) {
            return Ok(vec![]);
        }
        filter.author_id = Some(owner);
        self.list(&filter).await
    }
}

async fn lock_collection(conn: &mut PgConnection, id: i64) -> Result<Collection, DatabaseError> {
    sqlx::query_as::<_, Collection>("SELECT * FROM collections WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("collection {}", id)))
}

/// Strictly advances `updated_at` even when called twice within one clock tick.
async fn touch_collection(conn: &mut PgConnection, id: i64) -> Result<DateTime<Utc>, DatabaseError> {
    let updated_at: DateTime<Utc> = sqlx::query_scalar(
        "UPDATE collections \
         SET updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond') \
         WHERE id = $1 \
         RETURNING updated_at",
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(updated_at)
}

async fn load_images(conn: &mut PgConnection, collections: &mut [Collection]) -> Result<(), DatabaseError> {
    if collections.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = collections.iter().map(|c| c.id).collect();

    let images = sqlx::query_as::<_, Image>(
        "SELECT * FROM collections_images \
         WHERE collection_id = ANY($1) \
         ORDER BY created_at ASC, img_path ASC",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    for collection in collections.iter_mut() {
        collection.images.clear();
    }
    for image in images {
        if let Some(collection) = collections.iter_mut().find(|c| c.id == image.collection_id) {
            collection.images.push(image);
        }
    }
    Ok(())
}
