use crate::filtering::{FilterExpression, Projection, SortSpec};

/// Relation expansion request: replace the reference stored at `path` with
/// the related document(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Populate {
    pub path: String,
    /// Fields kept on each related document; all fields when `None`.
    pub select: Option<Projection>,
}

impl Populate {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            select: None,
        }
    }

    /// Limit expanded documents to a comma separated field list.
    #[must_use]
    pub fn select(mut self, fields: &str) -> Self {
        self.select = Projection::parse(fields);
        self
    }
}

impl From<&str> for Populate {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Populate {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

/// A find request built up the way document drivers chain them:
///
/// ```rust,ignore
/// let query = FindQuery::new(filter)
///     .select(projection)
///     .sort(sort)
///     .skip(8)
///     .limit(4)
///     .populate("courses");
/// ```
///
/// Backends apply filter, sort, skip/limit, relation expansion and
/// projection in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    filter: FilterExpression,
    projection: Option<Projection>,
    sort: Option<SortSpec>,
    skip: u64,
    limit: Option<u64>,
    populate: Vec<Populate>,
}

impl FindQuery {
    #[must_use]
    pub fn new(filter: FilterExpression) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn populate(mut self, populate: impl Into<Populate>) -> Self {
        self.populate.push(populate.into());
        self
    }

    #[must_use]
    pub fn filter(&self) -> &FilterExpression {
        &self.filter
    }

    #[must_use]
    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    #[must_use]
    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    #[must_use]
    pub fn skip_count(&self) -> u64 {
        self.skip
    }

    #[must_use]
    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub fn populates(&self) -> &[Populate] {
        &self.populate
    }
}
