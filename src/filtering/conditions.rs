use serde_json::{Map, Number, Value};
use std::fmt;

use super::{FilterError, RawQuery};

/// Prefix the data layer uses to tell operators apart from field names.
pub const OPERATOR_MARKER: char = '$';

/// Comparison operators accepted in bracket notation (`field[op]=value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// Membership (IN)
    In,
}

impl Operator {
    pub const ALL: [Self; 5] = [Self::Gt, Self::Gte, Self::Lt, Self::Lte, Self::In];

    /// Parse the bare query-string token (`gt`, `gte`, ...)
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    /// Parse the data-layer form (`$gt`, `$gte`, ...)
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        marker
            .strip_prefix(OPERATOR_MARKER)
            .and_then(Self::from_token)
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }

    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Rewrite every mapping key that is an operator token into its marker.
///
/// Only keys are touched, at any depth; field names and values containing
/// `gt`, `in`, ... are left alone. A comma separated `in` value becomes a
/// list.
#[must_use]
pub fn rewrite_operators(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| match Operator::from_token(&key) {
                    Some(Operator::In) => (Operator::In.marker().to_string(), membership_list(value)),
                    Some(operator) => (operator.marker().to_string(), rewrite_operators(value)),
                    None => (key, rewrite_operators(value)),
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(rewrite_operators).collect()),
        other => other,
    }
}

fn membership_list(value: Value) -> Value {
    match value {
        Value::String(list) => Value::Array(
            list.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(rewrite_operators).collect()),
        other => Value::Array(vec![rewrite_operators(other)]),
    }
}

/// One condition on one field. A field with several operators yields
/// several clauses, all of which must hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clause<'a> {
    Equals { field: &'a str, value: &'a Value },
    Compare { field: &'a str, operator: Operator, value: &'a Value },
}

impl<'a> Clause<'a> {
    #[must_use]
    pub const fn field(&self) -> &'a str {
        match self {
            Self::Equals { field, .. } | Self::Compare { field, .. } => field,
        }
    }
}

/// Field-level filter in data-layer form: `{"age": {"$gt": "18"}, "housing": "true"}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    document: Map<String, Value>,
}

impl FilterExpression {
    /// Matches every document.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Literal equality on a single field.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut document = Map::new();
        document.insert(field.into(), value.into());
        Self { document }
    }

    /// Drop control keys, rewrite operator tokens and validate the result.
    ///
    /// Top-level keys are field names and are never rewritten, so a field
    /// called `in` stays a field.
    ///
    /// # Errors
    ///
    /// See [`FilterExpression::from_document`].
    pub fn from_raw(raw: &RawQuery) -> Result<Self, FilterError> {
        let document = raw
            .filter_params()
            .into_iter()
            .map(|(field, value)| (field, rewrite_operators(value)))
            .collect();
        Self::from_document(document)
    }

    /// Accept a document that is already in data-layer form.
    ///
    /// # Errors
    ///
    /// - [`FilterError::InvalidField`] for empty or `$`-prefixed field names
    /// - [`FilterError::UnknownOperator`] for unsupported `$` keys
    /// - [`FilterError::MixedOperators`] when operators and plain keys share a field
    pub fn from_document(document: Map<String, Value>) -> Result<Self, FilterError> {
        for (field, value) in &document {
            if field.is_empty() || field.starts_with(OPERATOR_MARKER) {
                return Err(FilterError::InvalidField {
                    field: field.clone(),
                });
            }
            if let Value::Object(spec) = value {
                validate_operator_spec(field, spec)?;
            }
        }
        Ok(Self { document })
    }

    #[must_use]
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Flatten into clauses, in field order.
    #[must_use]
    pub fn clauses(&self) -> Vec<Clause<'_>> {
        let mut clauses = Vec::with_capacity(self.document.len());
        for (field, value) in &self.document {
            match value {
                Value::Object(spec) if is_operator_spec(spec) => {
                    for (marker, operand) in spec {
                        if let Some(operator) = Operator::from_marker(marker) {
                            clauses.push(Clause::Compare {
                                field,
                                operator,
                                value: operand,
                            });
                        }
                    }
                }
                _ => clauses.push(Clause::Equals { field, value }),
            }
        }
        clauses
    }
}

fn is_operator_spec(spec: &Map<String, Value>) -> bool {
    spec.keys().any(|key| key.starts_with(OPERATOR_MARKER))
}

fn validate_operator_spec(field: &str, spec: &Map<String, Value>) -> Result<(), FilterError> {
    if !is_operator_spec(spec) {
        return Ok(());
    }
    for key in spec.keys() {
        if !key.starts_with(OPERATOR_MARKER) {
            return Err(FilterError::MixedOperators {
                field: field.to_string(),
            });
        }
        if Operator::from_marker(key).is_none() {
            return Err(FilterError::UnknownOperator {
                field: field.to_string(),
                operator: key.clone(),
            });
        }
    }
    Ok(())
}

/// Type a query-string scalar: booleans, integers and finite floats are
/// recognised; everything else stays a string.
#[must_use]
pub fn coerce_scalar(raw: &str) -> Value {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(float) = trimmed.parse::<f64>()
        && let Some(number) = Number::from_f64(float)
    {
        return Value::Number(number);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expression(query: &str) -> Result<FilterExpression, FilterError> {
        FilterExpression::from_raw(&RawQuery::parse(query).unwrap())
    }

    #[test]
    fn test_operator_tokens_round_trip() {
        for operator in Operator::ALL {
            assert_eq!(Operator::from_token(operator.token()), Some(operator));
            assert_eq!(Operator::from_marker(operator.marker()), Some(operator));
        }
        assert_eq!(Operator::from_token("ne"), None);
        assert_eq!(Operator::from_marker("gt"), None);
    }

    #[test]
    fn test_gt_becomes_comparison_not_equality() {
        let filter = expression("age[gt]=18").unwrap();
        assert_eq!(filter.document().get("age"), Some(&json!({"$gt": "18"})));
        assert_eq!(
            filter.clauses(),
            vec![Clause::Compare {
                field: "age",
                operator: Operator::Gt,
                value: &json!("18"),
            }]
        );
    }

    #[test]
    fn test_every_operator_is_rewritten() {
        let filter =
            expression("a[gt]=1&b[gte]=2&c[lt]=3&d[lte]=4&e[in]=x,y").unwrap();
        assert_eq!(
            Value::Object(filter.document().clone()),
            json!({
                "a": {"$gt": "1"},
                "b": {"$gte": "2"},
                "c": {"$lt": "3"},
                "d": {"$lte": "4"},
                "e": {"$in": ["x", "y"]},
            })
        );
    }

    #[test]
    fn test_rewrite_leaves_substrings_alone() {
        // A blind text substitution would corrupt every one of these
        let filter = expression("title=Intro+in+Rust&integration=gt&lte_notes=in").unwrap();
        assert_eq!(
            Value::Object(filter.document().clone()),
            json!({
                "title": "Intro in Rust",
                "integration": "gt",
                "lte_notes": "in",
            })
        );
    }

    #[test]
    fn test_rewrite_nested_field_path() {
        let filter = expression("location[state][in]=MA,NY").unwrap();
        assert_eq!(
            filter.document().get("location"),
            Some(&json!({"state": {"$in": ["MA", "NY"]}}))
        );
        // Nested non-operator mappings are embedded-document equality
        assert!(matches!(filter.clauses()[0], Clause::Equals { field: "location", .. }));
    }

    #[test]
    fn test_repeated_in_values_stay_a_list() {
        let filter = expression("careers[in]=Business&careers[in]=Web+Development").unwrap();
        assert_eq!(
            filter.document().get("careers"),
            Some(&json!({"$in": ["Business", "Web Development"]}))
        );
    }

    #[test]
    fn test_control_keys_never_reach_filter() {
        let filter = expression("select=name&sort=name&page=1&limit=2&name=Devworks").unwrap();
        assert_eq!(filter.document().len(), 1);
        assert!(filter.document().contains_key("name"));
    }

    #[test]
    fn test_multiple_operators_on_one_field() {
        let filter = expression("averageCost[gte]=5000&averageCost[lt]=10000").unwrap();
        let clauses = filter.clauses();
        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(|clause| clause.field() == "averageCost"));
    }

    #[test]
    fn test_mixed_operators_rejected() {
        let err = expression("age[gt]=1&age[years]=3").unwrap_err();
        assert_eq!(err, FilterError::MixedOperators { field: "age".to_string() });
    }

    #[test]
    fn test_raw_marker_operators_are_validated() {
        let err = expression("age[$ne]=1").unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownOperator {
                field: "age".to_string(),
                operator: "$ne".to_string(),
            }
        );
        // A user may spell the marker directly for supported operators
        assert!(expression("age[$gt]=1").is_ok());
    }

    #[test]
    fn test_field_named_like_operator_is_a_field() {
        let filter = expression("in=5").unwrap();
        assert_eq!(filter.clauses(), vec![Clause::Equals { field: "in", value: &json!("5") }]);
    }

    #[test]
    fn test_command_like_field_rejected() {
        let err = expression("$where=1").unwrap_err();
        assert_eq!(err, FilterError::InvalidField { field: "$where".to_string() });
    }

    #[test]
    fn test_equals_constructor() {
        let filter = FilterExpression::equals("bootcamp", "abc");
        assert_eq!(
            filter.clauses(),
            vec![Clause::Equals { field: "bootcamp", value: &json!("abc") }]
        );
    }

    #[test]
    fn test_coerce_scalar() {
        assert_eq!(coerce_scalar("true"), json!(true));
        assert_eq!(coerce_scalar("42"), json!(42));
        assert_eq!(coerce_scalar("-7"), json!(-7));
        assert_eq!(coerce_scalar("10.5"), json!(10.5));
        assert_eq!(coerce_scalar("NaN"), json!("NaN"));
        assert_eq!(coerce_scalar("Boston"), json!("Boston"));
    }
}
