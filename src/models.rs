use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::filtering::PageWindow;

/// Control parameters accepted by every list endpoint.
///
/// Any other query parameter is a filter on the field of the same name:
/// - Literal equality: `housing=true`
/// - Comparisons: `averageCost[gt]=5000`, `averageCost[gte]`, `[lt]`, `[lte]`
/// - Membership: `careers[in]=Business,UI/UX`
///
/// This struct documents the parameters for `OpenAPI`; requests are parsed
/// with [`crate::RawQuery`] so bracketed filters survive.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Comma separated fields to return.
    ///
    /// Example: `name,description`
    #[param(example = "name,description")]
    pub select: Option<String>,
    /// Comma separated sort fields; prefix with `-` for descending.
    ///
    /// Defaults to `-createdAt`.
    #[param(example = "-averageCost,name")]
    pub sort: Option<String>,
    /// 1-based page number. Defaults to 1.
    #[param(example = "2")]
    pub page: Option<String>,
    /// Items per page. Defaults to 4.
    #[param(example = "10")]
    pub limit: Option<String>,
}

/// Link to a neighbouring page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageLink {
    pub page: u64,
    pub limit: u64,
}

/// Serialises as `{}` on a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

/// Body returned by paginated list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdvancedResults {
    pub success: bool,
    /// Number of records in `data`
    pub count: usize,
    pub pagination: Pagination,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    /// Total behind `pagination`; sent as a header, not in the body.
    #[serde(skip)]
    pub total: u64,
    #[serde(skip)]
    pub window: PageWindow,
}

/// Body returned by unpaginated listings such as `/bootcamps/{id}/courses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListResults {
    pub success: bool,
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

impl ListResults {
    #[must_use]
    pub fn new(data: Vec<Value>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Body returned when fetching a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemResult {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
}

impl ItemResult {
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self { success: true, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_pagination_serialises_as_empty_object() {
        assert_eq!(serde_json::to_value(Pagination::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_advanced_results_body_shape() {
        let results = AdvancedResults {
            success: true,
            count: 1,
            pagination: Pagination {
                next: Some(PageLink { page: 2, limit: 1 }),
                prev: None,
            },
            data: vec![json!({"name": "Devworks"})],
            total: 3,
            window: PageWindow::new(1, 1),
        };
        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            json!({
                "success": true,
                "count": 1,
                "pagination": {"next": {"page": 2, "limit": 1}},
                "data": [{"name": "Devworks"}],
            })
        );
    }

    #[test]
    fn test_list_results_counts_data() {
        let results = ListResults::new(vec![json!({}), json!({})]);
        assert!(results.success);
        assert_eq!(results.count, 2);
    }

    #[test]
    fn test_list_params_document_control_keys() {
        let params = ListParams::into_params(|| None);
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, crate::filtering::CONTROL_KEYS);
    }
}
