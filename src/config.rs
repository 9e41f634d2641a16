//! # List Query Configuration
//!
//! Defaults applied by the translator when a request leaves a control
//! parameter out, plus the switches that decide how pagination totals are
//! computed.
//!
//! ```rust,ignore
//! use querycrate::{CountMode, QueryConfig};
//!
//! let config = QueryConfig::default()
//!     .with_default_limit(25)
//!     .with_max_limit(100)
//!     .with_count_mode(CountMode::Filtered);
//! ```
//!
//! The same settings can be read from the environment with
//! [`QueryConfig::from_env`]:
//!
//! | Variable                   | Meaning                              |
//! |----------------------------|--------------------------------------|
//! | `QUERYCRATE_DEFAULT_LIMIT` | page size when `limit` is absent     |
//! | `QUERYCRATE_MAX_LIMIT`     | ceiling applied to `limit`           |
//! | `QUERYCRATE_COUNT_MODE`    | `collection` or `filtered`           |

use std::env;

/// Page size used when a request has no usable `limit`.
pub const DEFAULT_LIMIT: u64 = 4;

/// Sort applied when a request has no usable `sort`.
pub const DEFAULT_SORT: &str = "-createdAt";

const DEFAULT_LIMIT_VAR: &str = "QUERYCRATE_DEFAULT_LIMIT";
const MAX_LIMIT_VAR: &str = "QUERYCRATE_MAX_LIMIT";
const COUNT_MODE_VAR: &str = "QUERYCRATE_COUNT_MODE";

/// Which documents make up the `total` behind the pagination links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    /// Count the whole collection, ignoring the request filter.
    ///
    /// Links can point past the end of a filtered result set; kept as the
    /// default so existing clients see the same `next`/`prev` links.
    #[default]
    Collection,
    /// Count only the documents matching the request filter.
    Filtered,
}

impl CountMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "collection" => Some(Self::Collection),
            "filtered" => Some(Self::Filtered),
            _ => None,
        }
    }
}

/// Settings shared by every list endpoint built on this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub default_limit: u64,
    /// `None` leaves `limit` unbounded.
    pub max_limit: Option<u64>,
    pub count_mode: CountMode,
    pub default_sort: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
            count_mode: CountMode::default(),
            default_sort: DEFAULT_SORT.to_string(),
        }
    }
}

impl QueryConfig {
    /// Build a configuration from `QUERYCRATE_*` environment variables.
    ///
    /// Unset variables keep their default; unparseable ones are logged and
    /// ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(DEFAULT_LIMIT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(limit) if limit > 0 => config.default_limit = limit,
                _ => tracing::warn!(variable = DEFAULT_LIMIT_VAR, value = %raw, "Ignoring invalid default limit"),
            }
        }

        if let Some(raw) = lookup(MAX_LIMIT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(limit) if limit > 0 => config.max_limit = Some(limit),
                _ => tracing::warn!(variable = MAX_LIMIT_VAR, value = %raw, "Ignoring invalid max limit"),
            }
        }

        if let Some(raw) = lookup(COUNT_MODE_VAR) {
            match CountMode::parse(&raw) {
                Some(mode) => config.count_mode = mode,
                None => tracing::warn!(variable = COUNT_MODE_VAR, value = %raw, "Ignoring invalid count mode"),
            }
        }

        config
    }

    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn with_max_limit(mut self, limit: u64) -> Self {
        self.max_limit = Some(limit.max(1));
        self
    }

    #[must_use]
    pub fn with_count_mode(mut self, mode: CountMode) -> Self {
        self.count_mode = mode;
        self
    }

    #[must_use]
    pub fn with_default_sort(mut self, sort: impl Into<String>) -> Self {
        self.default_sort = sort.into();
        self
    }
}
