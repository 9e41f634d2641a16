//! # querycrate
//!
//! Query-string filtering, projection, sorting and pagination for list
//! endpoints in Axum, over any document store behind the [`Collection`]
//! trait.
//!
//! ```text
//! GET /api/v1/bootcamps?averageCost[lte]=10000&select=name,averageCost&sort=-averageCost&page=2&limit=2
//! ```
//!
//! becomes the filter `{"averageCost": {"$lte": "10000"}}`, a two-field
//! projection, a descending sort and a window skipping two documents. The
//! response is:
//!
//! ```json
//! {
//!   "success": true,
//!   "count": 2,
//!   "pagination": {"next": {"page": 3, "limit": 2}, "prev": {"page": 1, "limit": 2}},
//!   "data": [...]
//! }
//! ```
//!
//! ## Wiring
//!
//! ```rust,ignore
//! use querycrate::{ListResource, MemoryCollection, list_handler};
//!
//! let bootcamps = Arc::new(MemoryCollection::new("bootcamps"));
//! let app = Router::new()
//!     .route("/api/v1/bootcamps", get(list_handler))
//!     .with_state(ListResource::new(bootcamps).with_populate("courses"));
//! ```
//!
//! [`advanced_results_middleware`] does the same work as a middleware and
//! leaves the [`AdvancedResults`] in the request extensions.

pub mod config;
pub mod core;
pub mod database;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod operations;
pub mod routes;

pub use config::{CountMode, QueryConfig};
pub use core::{Collection, CollectionError, FindQuery, Populate};
pub use database::{ColumnKind, IdKind, MemoryCollection, Relation, SeaCollection};
pub use errors::ApiError;
pub use filtering::{FilterError, FilterExpression, PageWindow, Projection, RawQuery, SortSpec};
pub use models::{AdvancedResults, ItemResult, ListParams, ListResults, PageLink, Pagination};
pub use operations::{ListQuery, QueryError, advanced_results};
pub use routes::{
    ListResource, advanced_results_middleware, get_one_handler, list_handler,
    respond_with_advanced_results, scoped_list,
};
