use axum::http::header::HeaderMap;

use crate::config::{DEFAULT_LIMIT, QueryConfig};
use crate::models::{PageLink, Pagination};

/// The slice of results one request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
    /// Always `(page - 1) * limit`
    pub skip: u64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(1, DEFAULT_LIMIT)
    }
}

impl PageWindow {
    /// Zero values are raised to 1.
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        Self {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit),
        }
    }

    /// Window from the `page` and `limit` query parameters.
    ///
    /// Missing or unusable values fall back to page 1 and the configured
    /// default limit; `max_limit`, when set, caps the limit.
    #[must_use]
    pub fn from_params(page: Option<&str>, limit: Option<&str>, config: &QueryConfig) -> Self {
        let page = page.and_then(parse_positive).unwrap_or(1);
        let mut limit = limit
            .and_then(parse_positive)
            .unwrap_or(config.default_limit);
        if let Some(max_limit) = config.max_limit {
            limit = limit.min(max_limit);
        }
        Self::new(page, limit)
    }

    /// `next` exists while this page ends before `total`; `prev` exists
    /// after the first page.
    #[must_use]
    pub fn pagination(&self, total: u64) -> Pagination {
        let next = (self.skip.saturating_add(self.limit) < total).then(|| PageLink {
            page: self.page + 1,
            limit: self.limit,
        });
        let prev = (self.page > 1).then(|| PageLink {
            page: self.page - 1,
            limit: self.limit,
        });
        Pagination { next, prev }
    }
}

/// Integer prefix of a query value, as long as it is positive.
///
/// `"12"`, `" 12"` and `"12abc"` give 12; `"abc"`, `"0"`, `"-3"` and values
/// too large for `u64` give `None`.
#[must_use]
pub fn parse_positive(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: u64 = digits[..end].parse().ok()?;
    (!negative && value > 0).then_some(value)
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Build the `Content-Range` header for a page of results.
///
/// # Arguments
///
/// * `offset` - Index of the first returned item.
/// * `returned` - Number of items in this page.
/// * `total_count` - The total the pagination links were computed from.
/// * `resource_name` - Name of the listed resource.
///
/// Produces `"<resource> <first>-<last>/<total>"`, e.g. `bootcamps 0-3/10`.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    returned: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let last = offset.saturating_add(returned).saturating_sub(1).max(offset);

    // Sanitize resource name to prevent header injection
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = format!("{safe_name} {offset}-{last}/{total_count}");

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    } else if let Ok(value) = format!("items {offset}-{last}/{total_count}").parse() {
        headers.insert("Content-Range", value);
    }
    headers
}
