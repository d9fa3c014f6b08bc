use sqlx::{self, postgres::PgRow, FromRow, Postgres};

use crate::config::FilterConfig;
use crate::database::error::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::filter::FilterData;

/// Filter-driven reads against one table. Callers supply the executor so reads
/// can join the surrounding transaction.
pub struct Repository<T> {
    table_name: String,
    max_limit: Option<u32>,
    debug_logging: bool,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            table_name: self.table_name.clone(),
            max_limit: self.max_limit,
            debug_logging: self.debug_logging,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>, filter_config: &FilterConfig) -> Self {
        Self {
            table_name: table_name.into(),
            max_limit: filter_config.max_limit,
            debug_logging: filter_config.debug_logging,
            _phantom: std::marker::PhantomData,
        }
    }

    fn builder(&self, filter_data: FilterData) -> Result<QueryBuilder<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .max_limit(self.max_limit)
            .debug_logging(self.debug_logging)
            .filter(filter_data)
    }

    pub async fn select_any<'c, E>(&self, executor: E, filter_data: FilterData) -> Result<Vec<T>, DatabaseError>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        self.builder(filter_data)?.select_all(executor).await
    }

    pub async fn select_one<'c, E>(&self, executor: E, filter_data: FilterData) -> Result<Option<T>, DatabaseError>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        self.builder(filter_data.limit(1))?.select_optional(executor).await
    }

    /// Like [`select_one`](Self::select_one) but a missing row is `NotFound(label)`.
    pub async fn select_404<'c, E>(
        &self,
        executor: E,
        filter_data: FilterData,
        label: &str,
    ) -> Result<T, DatabaseError>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        self.select_one(executor, filter_data)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(label.to_string()))
    }
}
