//! # List Queries
//!
//! Paging, sorting and filtering parameters shared by the list endpoints.

use serde::Serialize;
use std::collections::HashMap;

/// Column filter, only sent when column, operator and value are all present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub column: String,
    pub operator: String,
    pub value: String,
}

/// Paging and sorting for backend list calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: i32,
    /// 0 lets the backend pick its own page size
    pub limit: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort_order: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl ListQuery {
    /// Build from raw query-string parameters.
    ///
    /// Non-numeric `page`/`limit` fall back to the defaults.
    pub fn from_params(params: &HashMap<String, String>, default_limit: i32) -> Self {
        let text = |key: &str| params.get(key).cloned().unwrap_or_default();

        let filter = match (
            params.get("filter_column"),
            params.get("filter_operator"),
            params.get("filter_value"),
        ) {
            (Some(column), Some(operator), Some(value))
                if !column.is_empty() && !operator.is_empty() && !value.is_empty() =>
            {
                Some(Filter {
                    column: column.clone(),
                    operator: operator.clone(),
                    value: value.clone(),
                })
            }
            _ => None,
        };

        Self {
            page: int_param(params, "page", 1),
            limit: int_param(params, "limit", default_limit),
            sort_by: text("sort_by"),
            sort_order: text("sort_order"),
            filter,
        }
    }
}

/// Integer query parameter with a default for absent or unparsable values
pub fn int_param(params: &HashMap<String, String>, key: &str, default: i32) -> i32 {
    params
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let query = ListQuery::from_params(&params(&[("page", "abc")]), 10);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert!(query.filter.is_none());
    }

    #[test]
    fn test_filter_requires_all_parts() {
        let partial = params(&[("filter_column", "name"), ("filter_value", "x")]);
        assert!(ListQuery::from_params(&partial, 0).filter.is_none());

        let full = params(&[
            ("filter_column", "name"),
            ("filter_operator", "eq"),
            ("filter_value", "x"),
            ("page", "3"),
        ]);
        let query = ListQuery::from_params(&full, 0);
        assert_eq!(query.page, 3);
        assert_eq!(
            query.filter,
            Some(Filter {
                column: "name".into(),
                operator: "eq".into(),
                value: "x".into()
            })
        );
    }
}
