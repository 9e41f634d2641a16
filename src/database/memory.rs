//! In-process document collection.
//!
//! Evaluates filter expressions the way a schema-aware document store does:
//! query-string values are cast to the type of the stored field before they
//! are compared, array fields match when any element matches, and dotted
//! paths reach into embedded documents.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::{Arc, RwLock, RwLockReadGuard, Weak};
use uuid::Uuid;

use crate::core::{Collection, CollectionError, FindQuery, Populate};
use crate::filtering::{Clause, FilterExpression, Operator, Projection, SortDirection, SortSpec};

pub const ID_FIELD: &str = "_id";
pub const CREATED_AT_FIELD: &str = "createdAt";

/// How a populate path finds its related documents.
#[derive(Debug, Clone)]
pub enum Relation {
    /// `local_field` holds the `_id` (or a list of `_id`s) of documents in
    /// `target`. A review's `bootcamp` field is a reference.
    Reference {
        target: Weak<MemoryCollection>,
        local_field: String,
    },
    /// Documents in `source` whose `foreign_field` equals this document's
    /// `_id`. A bootcamp's `courses` are a reverse relation.
    Reverse {
        source: Weak<MemoryCollection>,
        foreign_field: String,
    },
}

impl Relation {
    #[must_use]
    pub fn reference(target: &Arc<MemoryCollection>, local_field: impl Into<String>) -> Self {
        Self::Reference {
            target: Arc::downgrade(target),
            local_field: local_field.into(),
        }
    }

    #[must_use]
    pub fn reverse(source: &Arc<MemoryCollection>, foreign_field: impl Into<String>) -> Self {
        Self::Reverse {
            source: Arc::downgrade(source),
            foreign_field: foreign_field.into(),
        }
    }
}

#[derive(Debug)]
pub struct MemoryCollection {
    name: String,
    documents: RwLock<Vec<Value>>,
    relations: RwLock<Vec<(String, Relation)>>,
    unique_fields: Vec<String>,
    required_fields: Vec<String>,
}

impl MemoryCollection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
            relations: RwLock::new(Vec::new()),
            unique_fields: Vec::new(),
            required_fields: Vec::new(),
        }
    }

    /// Reject inserts that repeat an existing value of `field`.
    #[must_use]
    pub fn with_unique(mut self, field: impl Into<String>) -> Self {
        self.unique_fields.push(field.into());
        self
    }

    /// Reject inserts where `field` is missing or null.
    #[must_use]
    pub fn with_required(mut self, field: impl Into<String>) -> Self {
        self.required_fields.push(field.into());
        self
    }

    /// Register (or replace) the relation behind a populate path.
    ///
    /// # Errors
    ///
    /// [`CollectionError::Internal`] if the relation table lock is poisoned.
    pub fn relate(&self, path: impl Into<String>, relation: Relation) -> Result<(), CollectionError> {
        let path = path.into();
        let mut relations = self
            .relations
            .write()
            .map_err(|_| self.poisoned("relations"))?;
        relations.retain(|(existing, _)| *existing != path);
        relations.push((path, relation));
        Ok(())
    }

    /// Store a document, assigning `_id` and `createdAt` when absent.
    ///
    /// Returns the stored document.
    ///
    /// # Errors
    ///
    /// - [`CollectionError::Validation`] for non-objects and missing required fields
    /// - [`CollectionError::Duplicate`] for a repeated `_id` or unique field
    pub fn insert(&self, document: Value) -> Result<Value, CollectionError> {
        let Value::Object(fields) = document else {
            return Err(CollectionError::Validation {
                errors: vec!["Document must be a JSON object".to_string()],
            });
        };

        let missing: Vec<String> = self
            .required_fields
            .iter()
            .filter(|field| fields.get(field.as_str()).is_none_or(Value::is_null))
            .map(|field| format!("Path `{field}` is required."))
            .collect();
        if !missing.is_empty() {
            return Err(CollectionError::Validation { errors: missing });
        }

        let mut stored = Map::new();
        let id = fields
            .get(ID_FIELD)
            .cloned()
            .unwrap_or_else(|| Value::String(Uuid::new_v4().to_string()));
        stored.insert(ID_FIELD.to_string(), id);
        for (key, value) in fields {
            if key != ID_FIELD {
                stored.insert(key, value);
            }
        }
        if !stored.contains_key(CREATED_AT_FIELD) {
            stored.insert(
                CREATED_AT_FIELD.to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        let mut documents = self
            .documents
            .write()
            .map_err(|_| self.poisoned("documents"))?;
        let unique = std::iter::once(ID_FIELD).chain(self.unique_fields.iter().map(String::as_str));
        for field in unique {
            let Some(value) = stored.get(field) else {
                continue;
            };
            if documents.iter().any(|existing| existing.get(field) == Some(value)) {
                return Err(CollectionError::Duplicate {
                    field: field.to_string(),
                });
            }
        }

        let stored = Value::Object(stored);
        documents.push(stored.clone());
        Ok(stored)
    }

    /// Insert several documents, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`MemoryCollection::insert`].
    pub fn insert_many(
        &self,
        documents: impl IntoIterator<Item = Value>,
    ) -> Result<Vec<Value>, CollectionError> {
        documents.into_iter().map(|doc| self.insert(doc)).collect()
    }

    /// Number of stored documents; 0 if the store is unreadable.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().map_or(0, |documents| documents.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Value>>, CollectionError> {
        self.documents.read().map_err(|_| self.poisoned("documents"))
    }

    fn poisoned(&self, what: &str) -> CollectionError {
        CollectionError::Internal(format!("{} {what} lock poisoned", self.name))
    }

    fn matching(&self, filter: &FilterExpression) -> Result<Vec<Value>, CollectionError> {
        let clauses = filter.clauses();
        let documents = self.read()?;
        Ok(documents
            .iter()
            .filter(|doc| clauses.iter().all(|clause| clause_matches(doc, clause)))
            .cloned()
            .collect())
    }

    fn relation(&self, path: &str) -> Result<Relation, CollectionError> {
        let relations = self
            .relations
            .read()
            .map_err(|_| self.poisoned("relations"))?;
        relations
            .iter()
            .find(|(existing, _)| existing == path)
            .map(|(_, relation)| relation.clone())
            .ok_or_else(|| CollectionError::Unsupported {
                operation: format!("populate '{path}' on {}", self.name),
            })
    }

    fn populate(&self, documents: &mut [Value], populate: &Populate) -> Result<(), CollectionError> {
        let dropped = || CollectionError::Internal(format!("related collection for '{}' dropped", populate.path));
        match self.relation(&populate.path)? {
            Relation::Reference { target, local_field } => {
                let target = target.upgrade().ok_or_else(dropped)?;
                let related = target.read()?;
                let lookup = |id: &Value| {
                    related
                        .iter()
                        .find(|doc| doc.get(ID_FIELD).is_some_and(|candidate| loosely_equal(candidate, id)))
                        .map_or(Value::Null, |doc| project(doc, populate.select.as_ref(), &[]))
                };
                for document in documents.iter_mut() {
                    let expanded = match document.get(&local_field) {
                        Some(Value::Array(ids)) => Value::Array(ids.iter().map(lookup).collect()),
                        Some(Value::Null) | None => continue,
                        Some(id) => lookup(id),
                    };
                    set_field(document, &populate.path, expanded);
                }
            }
            Relation::Reverse { source, foreign_field } => {
                let source = source.upgrade().ok_or_else(dropped)?;
                let related = source.read()?;
                for document in documents.iter_mut() {
                    let Some(id) = document.get(ID_FIELD).cloned() else {
                        continue;
                    };
                    let children = related
                        .iter()
                        .filter(|child| equals_matches(get_path(child, &foreign_field), &id))
                        .map(|child| project(child, populate.select.as_ref(), &[]))
                        .collect();
                    set_field(document, &populate.path, Value::Array(children));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, query: &FindQuery) -> Result<Vec<Value>, CollectionError> {
        let mut documents = self.matching(query.filter())?;

        if let Some(sort) = query.sort_spec() {
            sort_documents(&mut documents, sort);
        }

        let skip = usize::try_from(query.skip_count()).unwrap_or(usize::MAX);
        let limit = query
            .limit_count()
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        let mut page: Vec<Value> = documents.into_iter().skip(skip).take(limit).collect();

        for populate in query.populates() {
            self.populate(&mut page, populate)?;
        }

        if let Some(projection) = query.projection() {
            let expanded: Vec<&str> = query.populates().iter().map(|p| p.path.as_str()).collect();
            page = page
                .iter()
                .map(|doc| project(doc, Some(projection), &expanded))
                .collect();
        }

        Ok(page)
    }

    async fn count(&self, filter: Option<&FilterExpression>) -> Result<u64, CollectionError> {
        let count = match filter {
            Some(filter) if !filter.is_empty() => self.matching(filter)?.len(),
            _ => self.read()?.len(),
        };
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

fn get_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = document.get(path) {
        return Some(value);
    }
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

fn set_field(document: &mut Value, field: &str, value: Value) {
    if let Value::Object(map) = document {
        map.insert(field.to_string(), value);
    }
}

fn clause_matches(document: &Value, clause: &Clause<'_>) -> bool {
    match *clause {
        Clause::Equals { field, value } => equals_matches(get_path(document, field), value),
        Clause::Compare { field, operator, value } => {
            compare_matches(get_path(document, field), operator, value)
        }
    }
}

fn equals_matches(found: Option<&Value>, expected: &Value) -> bool {
    match (found, expected) {
        (None | Some(Value::Null), Value::Null) => true,
        (None, _) => false,
        (Some(Value::Array(items)), expected) if !expected.is_array() => {
            items.iter().any(|item| loosely_equal(item, expected))
        }
        (Some(actual), expected) => loosely_equal(actual, expected),
    }
}

/// Equality after casting a query-string value to the stored type.
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(e)) => a.as_f64() == e.as_f64(),
        (Value::Number(a), Value::String(e)) => {
            e.trim().parse::<f64>().ok() == a.as_f64()
        }
        (Value::Bool(a), Value::String(e)) => e.trim().parse::<bool>() == Ok(*a),
        (Value::String(a), Value::Number(_) | Value::Bool(_)) => *a == expected.to_string(),
        (Value::Array(a), Value::Array(e)) => {
            a.len() == e.len() && a.iter().zip(e).all(|(x, y)| loosely_equal(x, y))
        }
        (Value::Object(a), Value::Object(e)) => {
            a.len() == e.len()
                && e.iter()
                    .all(|(key, value)| a.get(key).is_some_and(|found| loosely_equal(found, value)))
        }
        _ => actual == expected,
    }
}

fn compare_matches(found: Option<&Value>, operator: Operator, operand: &Value) -> bool {
    let Some(actual) = found else {
        return false;
    };
    let elements: Vec<&Value> = match actual {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    if operator == Operator::In {
        let candidates: Vec<&Value> = match operand {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        return elements
            .iter()
            .any(|element| candidates.iter().any(|candidate| loosely_equal(element, candidate)));
    }

    elements.iter().any(|element| {
        compare_cast(element, operand).is_some_and(|ordering| match operator {
            Operator::Gt => ordering.is_gt(),
            Operator::Gte => ordering.is_ge(),
            Operator::Lt => ordering.is_lt(),
            Operator::Lte => ordering.is_le(),
            Operator::In => false,
        })
    })
}

/// Ordering of a stored value against an operand. Values of different types
/// do not compare.
fn compare_cast(actual: &Value, operand: &Value) -> Option<Ordering> {
    match (actual, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Number(a), Value::String(b)) => a.as_f64()?.partial_cmp(&b.trim().parse::<f64>().ok()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

// Cross-type sort order: missing/null, numbers, strings, objects, arrays, booleans
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn sort_documents(documents: &mut [Value], sort: &SortSpec) {
    documents.sort_by(|a, b| {
        for key in sort.keys() {
            let ordering = compare_for_sort(get_path(a, &key.field), get_path(b, &key.field));
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// `_id`, then the selected fields in selection order, then `keep`.
fn project(document: &Value, projection: Option<&Projection>, keep: &[&str]) -> Value {
    let Some(projection) = projection else {
        return document.clone();
    };
    let mut projected = Map::new();
    if let Some(id) = document.get(ID_FIELD) {
        projected.insert(ID_FIELD.to_string(), id.clone());
    }
    let fields = projection.fields().iter().map(String::as_str).chain(keep.iter().copied());
    for field in fields {
        if let Some(value) = get_path(document, field) {
            projected.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}
