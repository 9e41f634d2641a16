//! # Advanced Results
//!
//! The list pipeline shared by every paginated endpoint:
//!
//! 1. [`ListQuery::from_raw`] translates the query string into a filter
//!    expression, projection, sort and page window. Pure and repeatable.
//! 2. [`advanced_results`] counts, fetches the page and attaches pagination
//!    links.
//!
//! ```rust,ignore
//! let raw = RawQuery::parse("averageCost[lte]=10000&select=name&page=2")?;
//! let results = advanced_results(&bootcamps, &raw, Some(&Populate::new("courses")), &config).await?;
//! assert!(results.success);
//! ```

use std::fmt;

use crate::config::{CountMode, QueryConfig};
use crate::core::{Collection, CollectionError, FindQuery, Populate};
use crate::filtering::{FilterError, FilterExpression, PageWindow, Projection, RawQuery, SortSpec};
use crate::models::AdvancedResults;

/// Failure of the list pipeline.
#[derive(Debug)]
pub enum QueryError {
    Filter(FilterError),
    Collection(CollectionError),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(err) => write!(f, "{err}"),
            Self::Collection(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Filter(err) => Some(err),
            Self::Collection(err) => Some(err),
        }
    }
}

impl From<FilterError> for QueryError {
    fn from(err: FilterError) -> Self {
        Self::Filter(err)
    }
}

impl From<CollectionError> for QueryError {
    fn from(err: CollectionError) -> Self {
        Self::Collection(err)
    }
}

/// A list request after translation, before touching any data.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: FilterExpression,
    pub projection: Option<Projection>,
    pub sort: Option<SortSpec>,
    pub window: PageWindow,
}

impl ListQuery {
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the filter keys cannot form a filter
    /// expression. Malformed control keys never fail; they fall back to
    /// their defaults.
    pub fn from_raw(raw: &RawQuery, config: &QueryConfig) -> Result<Self, FilterError> {
        let filter = FilterExpression::from_raw(raw)?;
        let projection = raw.control("select").and_then(Projection::parse);
        let sort = SortSpec::from_param(raw.control("sort"), &config.default_sort);
        let window = PageWindow::from_params(raw.control("page"), raw.control("limit"), config);

        Ok(Self {
            filter,
            projection,
            sort,
            window,
        })
    }

    /// The find request for this page, without relation expansion.
    #[must_use]
    pub fn find_query(&self) -> FindQuery {
        let mut query = FindQuery::new(self.filter.clone());
        if let Some(projection) = &self.projection {
            query = query.select(projection.clone());
        }
        if let Some(sort) = &self.sort {
            query = query.sort(sort.clone());
        }
        query.skip(self.window.skip).limit(self.window.limit)
    }
}

/// Run a paginated list request against `collection`.
///
/// The total behind the pagination links is read before the page is
/// fetched. With [`CountMode::Collection`] it is the size of the whole
/// collection, so links may run past the end of a filtered result.
///
/// # Errors
///
/// [`QueryError::Filter`] for untranslatable filters,
/// [`QueryError::Collection`] for anything the backend reports. Nothing is
/// retried.
pub async fn advanced_results<C>(
    collection: &C,
    raw: &RawQuery,
    populate: Option<&Populate>,
    config: &QueryConfig,
) -> Result<AdvancedResults, QueryError>
where
    C: Collection + ?Sized,
{
    let list = ListQuery::from_raw(raw, config)?;

    tracing::debug!(
        collection = collection.name(),
        filter = ?list.filter.document(),
        select = ?list.projection.as_ref().map(Projection::fields),
        sort = %list.sort.as_ref().map(ToString::to_string).unwrap_or_default(),
        page = list.window.page,
        limit = list.window.limit,
        "Translated list query"
    );

    let total = match config.count_mode {
        CountMode::Collection => collection.count(None).await?,
        CountMode::Filtered => collection.count(Some(&list.filter)).await?,
    };

    let mut query = list.find_query();
    if let Some(populate) = populate {
        query = query.populate(populate.clone());
    }
    let data = collection.find(&query).await?;

    Ok(AdvancedResults {
        success: true,
        count: data.len(),
        pagination: list.window.pagination(total),
        data,
        total,
        window: list.window,
    })
}
