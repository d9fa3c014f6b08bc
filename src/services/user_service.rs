use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::auth::password::verify_password;
use crate::config::FilterConfig;
use crate::database::models::{NewUser, User, UserFilter, UserPatch};
use crate::database::{DatabaseError, Repository};
use crate::filter::FilterData;

const EMAIL_TAKEN: &str = "email is already in use";

/// Persistence for user accounts. Every operation runs in its own transaction.
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    users: Repository<User>,
}

impl UserService {
    pub fn new(pool: PgPool, filter_config: &FilterConfig) -> Self {
        Self {
            pool,
            users: Repository::new("users", filter_config),
        }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING *",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(e).describe_duplicate(EMAIL_TAKEN))?;

        tx.commit().await?;
        debug!(user_id = user.id, "user created");
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, DatabaseError> {
        self.find_one(UserFilter { id: Some(id), ..Default::default() }).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        self.find_one(UserFilter { email: Some(email.to_string()), ..Default::default() }).await
    }

    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let users = self.users.select_any(&mut *tx, FilterData::from(filter)).await?;
        tx.commit().await?;
        Ok(users)
    }

    /// Applies the present patch fields and saves. The caller's copy is untouched on failure.
    pub async fn update(&self, user: &User, patch: UserPatch) -> Result<User, DatabaseError> {
        let mut next = user.clone();
        next.apply(patch);

        let mut tx = self.pool.begin().await?;

        let updated_at: DateTime<Utc> = sqlx::query_scalar(
            "UPDATE users \
             SET email = $2, password_hash = $3, \
                 updated_at = GREATEST(NOW(), updated_at + INTERVAL '1 microsecond') \
             WHERE id = $1 \
             RETURNING updated_at",
        )
        .bind(next.id)
        .bind(&next.email)
        .bind(&next.password_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from(e).describe_duplicate(EMAIL_TAKEN))?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {}", next.id)))?;

        tx.commit().await?;

        next.updated_at = updated_at;
        debug!(user_id = next.id, "user updated");
        Ok(next)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }

        tx.commit().await?;
        debug!(user_id = id, "user deleted");
        Ok(())
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DatabaseError> {
        let denied = || DatabaseError::Unauthorized("invalid email or password".to_string());

        let user = match self.get_by_email(email).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound(_)) => return Err(denied()),
            Err(other) => return Err(other),
        };

        if !verify_password(password, &user.password_hash) {
            return Err(denied());
        }
        Ok(user)
    }

    async fn find_one(&self, filter: UserFilter) -> Result<User, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let user = self.users.select_404(&mut *tx, FilterData::from(&filter), "user").await?;
        tx.commit().await?;
        Ok(user)
    }
}
