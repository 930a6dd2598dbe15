use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, SqlResult};

/// Builds parameterized SELECT / COUNT / GROUP BY statements for one table
/// from a JSON filter document.
pub struct Filter {
    table_name: String,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause {
            self.where_clause(where_clause)?;
        }
        if let Some(order) = data.order {
            self.order(order)?;
        }
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.render_where()?;
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

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.render_where()?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        Ok(SqlResult { query, params })
    }

    /// Group-by-count over a single column; the grouped value is returned as
    /// jsonb so text and boolean columns round-trip with their JSON types.
    pub fn to_group_count_sql(&self, column: &str) -> Result<SqlResult, FilterError> {
        Self::validate_column_name(column)?;
        let (where_clause, params) = self.render_where()?;
        let where_part = if where_clause.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clause)
        };
        let query = format!(
            "SELECT to_jsonb(\"{col}\") AS value, COUNT(*) AS count FROM \"{table}\"{where_part} GROUP BY \"{col}\" ORDER BY count DESC, value ASC",
            col = column,
            table = self.table_name,
        );
        Ok(SqlResult { query, params })
    }

    fn render_where(&self) -> Result<(String, Vec<Value>), FilterError> {
        match &self.where_data {
            Some(where_data) => FilterWhere::generate(where_data, 0),
            None => Ok((String::new(), vec![])),
        }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidTableName("Table name cannot be empty".to_string()));
        }
        let first = name.chars().next().unwrap();
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') || (!first.is_alphabetic() && first != '_') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn validate_column_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() {
            return Err(FilterError::InvalidColumn("Column name cannot be empty".to_string()));
        }
        let first = name.chars().next().unwrap();
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') || (!first.is_alphabetic() && first != '_') {
            return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", name)));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter_with(data: FilterData) -> Filter {
        let mut f = Filter::new("products").unwrap();
        f.assign(data).unwrap();
        f
    }

    #[test]
    fn bare_select() {
        let f = Filter::new("products").unwrap();
        let sql = f.to_sql().unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"products\"");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn full_listing_query() {
        let f = filter_with(FilterData {
            where_clause: Some(json!({"collection": "winter", "category": {"$in": ["hats"]}})),
            order: Some(json!("sale_price asc")),
            limit: Some(2),
            offset: Some(2),
        });
        let sql = f.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"products\" WHERE \"category\" IN ($1) AND \"collection\" = $2 ORDER BY \"sale_price\" ASC LIMIT 2 OFFSET 2"
        );
        assert_eq!(sql.params, vec![json!("hats"), json!("winter")]);
    }

    #[test]
    fn count_sql_drops_order_and_limit() {
        let f = filter_with(FilterData {
            where_clause: Some(json!({"collection": "winter"})),
            order: Some(json!("created_at desc")),
            limit: Some(10),
            offset: None,
        });
        let sql = f.to_count_sql().unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) AS count FROM \"products\" WHERE \"collection\" = $1");
    }

    #[test]
    fn group_count_sql() {
        let f = filter_with(FilterData {
            where_clause: Some(json!({"collection": "winter"})),
            ..Default::default()
        });
        let sql = f.to_group_count_sql("category").unwrap();
        assert_eq!(
            sql.query,
            "SELECT to_jsonb(\"category\") AS value, COUNT(*) AS count FROM \"products\" WHERE \"collection\" = $1 GROUP BY \"category\" ORDER BY count DESC, value ASC"
        );
    }

    #[test]
    fn group_count_rejects_bad_column() {
        let f = Filter::new("products").unwrap();
        assert!(f.to_group_count_sql("category; DROP").is_err());
    }

    #[test]
    fn rejects_bad_table() {
        assert!(Filter::new("products; DROP TABLE users").is_err());
    }

    #[test]
    fn rejects_negative_limit() {
        let mut f = Filter::new("products").unwrap();
        assert!(f.limit(-1, None).is_err());
    }
}
