use crate::database::models::Collection;
use crate::database::DatabaseError;

use super::Identity;

/// True iff the identity is a concrete user who authored the collection.
pub fn can_access(identity: &Identity, collection: &Collection) -> bool {
    match identity {
        Identity::User(user) => user.id == collection.author_id,
        Identity::Anonymous => false,
    }
}

pub fn authorize(identity: &Identity, collection: &Collection) -> Result<(), DatabaseError> {
    if can_access(identity, collection) {
        return Ok(());
    }
    tracing::warn!(
        user_id = ?identity.user_id(),
        collection_id = collection.id,
        "collection access denied"
    );
    Err(DatabaseError::Unauthorized(format!("collection {}", collection.id)))
}
