use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value) -> Result<Vec<FilterOrderInfo>, FilterError> {
        match order {
            Value::String(s) => Self::parse_order_string(s),
            Value::Array(arr) => {
                // Array of strings like ["created_at desc", "name asc"]
                let mut out = Vec::new();
                for v in arr {
                    if let Value::String(s) = v {
                        out.extend(Self::parse_order_string(s)?);
                    }
                }
                Ok(out)
            }
            Value::Object(obj) => {
                // { "created_at": "desc", "name": "asc" }
                let mut out = Vec::new();
                for (k, v) in obj {
                    Self::validate_column(k)?;
                    let sort = match v.as_str().unwrap_or("asc").to_ascii_lowercase().as_str() {
                        "desc" => SortDirection::Desc,
                        _ => SortDirection::Asc,
                    };
                    out.push(FilterOrderInfo { column: k.clone(), sort });
                }
                Ok(out)
            }
            _ => Ok(vec![]),
        }
    }

    fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                Self::validate_column(col)?;
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        Ok(out)
    }

    fn validate_column(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => name.chars().all(|c| c.is_alphanumeric() || c == '_'),
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", name)))
        }
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() {
            return Ok(String::new());
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_order_string() {
        let infos = FilterOrder::validate_and_parse(&json!("sale_price asc")).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].column, "sale_price");
        assert_eq!(infos[0].sort, SortDirection::Asc);
    }

    #[test]
    fn generates_order_clause() {
        let infos = FilterOrder::validate_and_parse(&json!("created_at desc, name asc")).unwrap();
        let sql = FilterOrder::generate(&infos).unwrap();
        assert_eq!(sql, "ORDER BY \"created_at\" DESC, \"name\" ASC");
    }

    #[test]
    fn rejects_hostile_order_column() {
        let err = FilterOrder::validate_and_parse(&json!("1;DROP desc")).unwrap_err();
        assert!(matches!(err, FilterError::InvalidColumn(_)));
    }
}
