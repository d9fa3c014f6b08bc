use thiserror::Error;

use crate::filter::FilterError;

/// Failure kinds surfaced by the persistence layer.
///
/// `Query`, `Migration` and `Sqlx` are internal failures; their detail is logged,
/// never shown to clients.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    DuplicateKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Image already attached: {0}")]
    AlreadyAttached(String),

    #[error("Image not attached: {0}")]
    NotAttached(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Query(_) | Self::Migration(_) | Self::Sqlx(_))
    }

    /// Replaces the constraint name of a `DuplicateKey` with a caller-facing message.
    pub fn describe_duplicate(self, message: &str) -> Self {
        match self {
            Self::DuplicateKey(_) => Self::DuplicateKey(message.to_string()),
            other => other,
        }
    }

    /// Replaces the detail of a `NotFound` raised by a dangling reference.
    pub fn describe_missing(self, label: &str) -> Self {
        match self {
            Self::NotFound(_) => Self::NotFound(label.to_string()),
            other => other,
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or("unique constraint").to_string();
                return Self::DuplicateKey(constraint);
            }
            // The referenced row is gone, e.g. a collection insert for a deleted author.
            if db.is_foreign_key_violation() {
                let constraint = db.constraint().unwrap_or("foreign key").to_string();
                return Self::NotFound(constraint);
            }
        }
        if let sqlx::Error::RowNotFound = err {
            return Self::NotFound("Record not found".to_string());
        }
        Self::Sqlx(err)
    }
}

impl From<FilterError> for DatabaseError {
    fn from(err: FilterError) -> Self {
        Self::Query(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(DatabaseError::from(sqlx::Error::RowNotFound), DatabaseError::NotFound(_)));
    }

    #[test]
    fn other_driver_errors_are_internal() {
        let err = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(err.is_internal());
        assert!(matches!(err, DatabaseError::Sqlx(_)));
    }

    #[test]
    fn filter_errors_are_internal() {
        let err = DatabaseError::from(FilterError::InvalidColumn("bad col".into()));
        assert!(err.is_internal());
    }

    #[test]
    fn describe_duplicate_only_touches_duplicates() {
        let described = DatabaseError::DuplicateKey("users_email_key".into())
            .describe_duplicate("email is already in use");
        assert_eq!(described.to_string(), "email is already in use");

        let untouched = DatabaseError::NotFound("user".into()).describe_duplicate("ignored");
        assert!(matches!(untouched, DatabaseError::NotFound(_)));
    }

    #[test]
    fn describe_missing_only_touches_not_found() {
        let described = DatabaseError::NotFound("collections_author_id_fkey".into()).describe_missing("user");
        assert_eq!(described.to_string(), "Not found: user");

        let untouched = DatabaseError::DuplicateKey("users_email_key".into()).describe_missing("user");
        assert!(matches!(untouched, DatabaseError::DuplicateKey(_)));
    }
}
