use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    /// `name` sorts ascending, `-name` descending.
    fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (field, direction) = match token.strip_prefix('-') {
            Some(field) => (field.trim(), SortDirection::Desc),
            None => (token, SortDirection::Asc),
        };
        (!field.is_empty()).then(|| Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Asc => write!(f, "{}", self.field),
            SortDirection::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Sort keys in priority order; the first key is the primary sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse `sort=-createdAt,name`. Returns `None` if no usable key remains.
    #[must_use]
    pub fn parse(sort: &str) -> Option<Self> {
        let keys: Vec<SortKey> = sort.split(',').filter_map(SortKey::parse).collect();
        (!keys.is_empty()).then_some(Self { keys })
    }

    /// The request sort, or `default_sort` when the request has none.
    #[must_use]
    pub fn from_param(sort: Option<&str>, default_sort: &str) -> Option<Self> {
        sort.and_then(Self::parse)
            .or_else(|| Self::parse(default_sort))
    }

    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.keys.iter().map(ToString::to_string).collect();
        f.write_str(&tokens.join(","))
    }
}
