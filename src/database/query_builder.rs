use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow, Postgres};

use crate::database::error::DatabaseError;
use crate::filter::{Filter, FilterData, SqlParam, SqlResult};

pub struct QueryBuilder<T> {
    table_name: String,
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let table_name = table_name.into();
        let filter = Filter::new(&table_name)?;
        Ok(Self {
            table_name,
            filter,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn max_limit(mut self, max_limit: Option<u32>) -> Self {
        self.filter.max_limit(max_limit);
        self
    }

    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.filter.debug_logging(enabled);
        self
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        self.filter.assign(filter_data)?;
        Ok(self)
    }

    pub async fn select_all<'c, E>(self, executor: E) -> Result<Vec<T>, DatabaseError>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        let sql_result = self.sql_result()?;
        let rows = bind_all(sqlx::query_as::<_, T>(&sql_result.query), &sql_result.params)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn select_optional<'c, E>(self, executor: E) -> Result<Option<T>, DatabaseError>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        let sql_result = self.sql_result()?;
        let row = bind_all(sqlx::query_as::<_, T>(&sql_result.query), &sql_result.params)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    fn sql_result(&self) -> Result<SqlResult, DatabaseError> {
        self.filter.to_sql().map_err(|e| {
            DatabaseError::Query(format!("{} (table {})", e, self.table_name))
        })
    }
}

fn bind_all<'q, O>(
    mut q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for param in params {
        q = bind_param_query_as(q, param);
    }
    q
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.clone()),
    }
}
