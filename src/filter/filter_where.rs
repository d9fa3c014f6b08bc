use std::collections::HashSet;

use super::error::FilterError;
use super::types::{FilterWhereInfo, SqlParam};

/// Builds an AND-joined list of `"column" = $n` terms.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns the clause body (without the `WHERE` keyword) and its ordered params.
    /// An empty condition list yields an empty clause and no params.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
    ) -> Result<(String, Vec<SqlParam>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        filter_where.build(conditions)
    }

    pub fn validate(conditions: &[FilterWhereInfo]) -> Result<(), FilterError> {
        let mut seen = HashSet::new();
        for condition in conditions {
            validate_identifier(&condition.column)
                .map_err(|_| FilterError::InvalidColumn(condition.column.clone()))?;
            if !seen.insert(condition.column.as_str()) {
                return Err(FilterError::DuplicatePredicate(condition.column.clone()));
            }
        }
        Ok(())
    }

    fn build(&mut self, conditions: &[FilterWhereInfo]) -> Result<(String, Vec<SqlParam>), FilterError> {
        Self::validate(conditions)?;

        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let placeholder = self.param(condition.data.clone());
            sql_conditions.push(format!("\"{}\" = {}", condition.column, placeholder));
        }

        Ok((sql_conditions.join(" AND "), std::mem::take(&mut self.param_values)))
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Identifiers are interpolated (quoted) into SQL, so only plain names pass.
pub(crate) fn validate_identifier(name: &str) -> Result<(), ()> {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return Err(()),
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(())
    }
}
