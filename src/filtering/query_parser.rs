use serde_json::{Map, Value, map::Entry};

use super::FilterError;

/// Query-string keys read by the translator instead of being used as filters.
pub const CONTROL_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

// Same nesting limit as the `qs` parser most document APIs are written against
const MAX_DEPTH: usize = 5;

/// The request query string as a nested mapping.
///
/// Bracket notation is expanded and repeated keys are collected:
///
/// ```rust,ignore
/// // ?age[gt]=18&tag=a&tag=b&page=2
/// // {"age": {"gt": "18"}, "tag": ["a", "b"], "page": "2"}
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQuery {
    params: Map<String, Value>,
}

impl RawQuery {
    /// Parse a URL-encoded query string (without the leading `?`).
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::ConflictingKey`] when a key is used both as a
    /// plain value and as a bracketed mapping, e.g. `age=3&age[gt]=1`.
    pub fn parse(query: &str) -> Result<Self, FilterError> {
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Build from already-decoded key/value pairs.
    ///
    /// # Errors
    ///
    /// See [`RawQuery::parse`].
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, FilterError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Map::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            if key.is_empty() {
                continue;
            }
            let segments = split_key(key);
            insert(&mut params, key, &segments, value.into())?;
        }
        Ok(Self { params })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// String value of a control key. Repeated keys yield their first value.
    #[must_use]
    pub fn control(&self, key: &str) -> Option<&str> {
        match self.params.get(key)? {
            Value::String(value) => Some(value),
            Value::Array(values) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }

    /// Copy of the parameters with every control key removed.
    #[must_use]
    pub fn filter_params(&self) -> Map<String, Value> {
        self.params
            .iter()
            .filter(|(key, _)| !CONTROL_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.params
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl From<Map<String, Value>> for RawQuery {
    fn from(params: Map<String, Value>) -> Self {
        Self { params }
    }
}

/// Split `a[b][c]` into `["a", "b", "c"]`.
///
/// Keys starting with `[` or without brackets stay literal. Segments past
/// `MAX_DEPTH`, or after an unclosed bracket, are kept as one literal segment.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 {
        return vec![key.to_string()];
    }

    let mut segments = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while segments.len() <= MAX_DEPTH {
        let Some(inner) = rest.strip_prefix('[') else {
            break;
        };
        let Some(close) = inner.find(']') else {
            break;
        };
        segments.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(rest.to_string());
    }
    segments
}

fn insert(
    map: &mut Map<String, Value>,
    key: &str,
    segments: &[String],
    value: String,
) -> Result<(), FilterError> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };

    // `a` or `a[]`
    let append = matches!(rest, [last] if last.is_empty());
    if rest.is_empty() || append {
        match map.entry(head.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(if append {
                    Value::Array(vec![Value::String(value)])
                } else {
                    Value::String(value)
                });
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(items) => items.push(Value::String(value)),
                existing @ Value::String(_) => {
                    let previous = existing.take();
                    *existing = Value::Array(vec![previous, Value::String(value)]);
                }
                _ => {
                    return Err(FilterError::ConflictingKey {
                        key: key.to_string(),
                    });
                }
            },
        }
        return Ok(());
    }

    match map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(child) => insert(child, key, rest, value),
        _ => Err(FilterError::ConflictingKey {
            key: key.to_string(),
        }),
    }
}
