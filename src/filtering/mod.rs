//! # Query-String Filtering, Sorting & Pagination
//!
//! Translates the query string of a list request into the four parts of a
//! document query: a filter expression, a projection, a sort and a page
//! window.
//!
//! ## Query Parameter Examples
//!
//! ```rust,ignore
//! // Literal equality
//! GET /bootcamps?housing=true
//!
//! // Comparisons with bracket notation
//! GET /bootcamps?averageCost[lte]=10000
//! GET /courses?tuition[gte]=5000&tuition[lt]=10000
//!
//! // Membership
//! GET /bootcamps?careers[in]=Business,UI/UX
//!
//! // Projection and sorting
//! GET /bootcamps?select=name,description&sort=-averageCost,name
//!
//! // Pagination (defaults: page=1, limit=4)
//! GET /bootcamps?page=2&limit=10
//! ```
//!
//! Control keys (`select`, `sort`, `page`, `limit`) are never used as
//! filters; every other key is.

pub mod conditions;
pub mod pagination;
pub mod query_parser;
pub mod select;
pub mod sort;

pub use conditions::{Clause, FilterExpression, Operator, coerce_scalar, rewrite_operators};
pub use pagination::{PageWindow, calculate_content_range, parse_positive};
pub use query_parser::{CONTROL_KEYS, RawQuery};
pub use select::Projection;
pub use sort::{SortDirection, SortKey, SortSpec};

use std::fmt;

/// A query string that cannot be turned into a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A key used both as a plain value and as a bracketed mapping.
    ConflictingKey { key: String },
    /// Operators and plain sub-keys mixed under one field.
    MixedOperators { field: String },
    /// A `$`-prefixed key that is not a supported operator.
    UnknownOperator { field: String, operator: String },
    /// A field name the data layer would interpret as a command.
    InvalidField { field: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConflictingKey { key } => {
                write!(f, "Query parameter '{key}' conflicts with another parameter of the same name")
            }
            Self::MixedOperators { field } => {
                write!(f, "Filter on '{field}' mixes comparison operators with plain values")
            }
            Self::UnknownOperator { field, operator } => {
                write!(f, "Unsupported operator '{operator}' on field '{field}'")
            }
            Self::InvalidField { field } => write!(f, "Invalid filter field '{field}'"),
        }
    }
}

impl std::error::Error for FilterError {}
