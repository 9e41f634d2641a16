/// Ordered list of fields to include in returned records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    /// Parse `select=name,description`.
    ///
    /// Blank entries and repeats are dropped, first occurrence wins. Returns
    /// `None` when nothing is left. Field names are not checked here; unknown
    /// fields are left for the data layer to ignore or reject.
    #[must_use]
    pub fn parse(select: &str) -> Option<Self> {
        Self::from_fields(select.split(','))
    }

    #[must_use]
    pub fn from_fields<I, S>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for field in fields {
            let field = field.as_ref().trim();
            if !field.is_empty() && !unique.iter().any(|seen| seen == field) {
                unique.push(field.to_string());
            }
        }
        (!unique.is_empty()).then_some(Self { fields: unique })
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}
