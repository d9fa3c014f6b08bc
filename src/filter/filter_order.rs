use super::error::FilterError;
use super::filter_where::validate_identifier;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Renders `ORDER BY ...`. Without explicit ordering, rows come back by ascending `id`.
    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() {
            return Ok(format!("ORDER BY \"id\" {}", SortDirection::Asc.to_sql()));
        }
        for info in infos {
            validate_identifier(&info.column).map_err(|_| FilterError::InvalidColumn(info.column.clone()))?;
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}
