/// A value bound to a positional placeholder. Values never enter query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

/// Sparse set of equality predicates plus pagination bounds.
///
/// Predicates keep the order in which they were added; that order decides
/// placeholder numbering. `limit == 0` means unbounded, `offset == 0` means no skip.
#[derive(Debug, Clone, Default)]
pub struct FilterData {
    pub where_data: Vec<FilterWhereInfo>,
    pub order: Vec<FilterOrderInfo>,
    pub limit: u32,
    pub offset: u32,
}

impl FilterData {
    /// Adds `column = value` when `value` is present, otherwise leaves the filter unconstrained.
    pub fn eq<V: Into<SqlParam>>(mut self, column: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.where_data.push(FilterWhereInfo {
                column: column.to_string(),
                data: value.into(),
            });
        }
        self
    }

    pub fn order_by(mut self, column: &str, sort: SortDirection) -> Self {
        self.order.push(FilterOrderInfo {
            column: column.to_string(),
            sort,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterWhereInfo {
    pub column: String,
    pub data: SqlParam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
