use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{validate_identifier, FilterWhere};
use super::types::{FilterData, FilterOrderInfo, FilterWhereInfo, SqlResult};

/// Turns a [`FilterData`] into a parameterized `SELECT` against one table.
pub struct Filter {
    table_name: String,
    where_data: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: u32,
    offset: u32,
    max_limit: Option<u32>,
    debug_logging: bool,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            where_data: vec![],
            order_data: vec![],
            limit: 0,
            offset: 0,
            max_limit: None,
            debug_logging: false,
        })
    }

    /// Caps any non-zero limit. Unbounded (`0`) requests are left alone.
    pub fn max_limit(&mut self, max_limit: Option<u32>) -> &mut Self {
        self.max_limit = max_limit;
        self
    }

    pub fn debug_logging(&mut self, enabled: bool) -> &mut Self {
        self.debug_logging = enabled;
        self
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&data.where_data)?;
        self.where_data = data.where_data;
        self.order_data = data.order;
        self.limit = data.limit;
        self.offset = data.offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.where_data, 0)?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        if self.debug_logging {
            tracing::debug!(query = %query, params = params.len(), "filter compiled");
        }

        Ok(SqlResult { query, params })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        validate_identifier(name).map_err(|_| FilterError::InvalidTableName(name.to_string()))
    }

    fn effective_limit(&self) -> u32 {
        let limit = capped_limit(self.limit, self.max_limit);
        if self.debug_logging && limit != self.limit {
            tracing::debug!("Limit {} exceeds max {}, capping to max", self.limit, limit);
        }
        limit
    }

    fn build_limit_clause(&self) -> String {
        let limit = self.effective_limit();
        match (limit, self.offset) {
            (0, 0) => String::new(),
            (0, o) => format!("OFFSET {}", o),
            (l, 0) => format!("LIMIT {}", l),
            (l, o) => format!("LIMIT {} OFFSET {}", l, o),
        }
    }
}

/// The limit a query actually runs with. `0` stays unbounded.
pub fn capped_limit(limit: u32, max_limit: Option<u32>) -> u32 {
    match max_limit {
        Some(max) if limit > max => max,
        _ => limit,
    }
}
