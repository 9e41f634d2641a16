use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, FromQueryResult, JsonValue,
    sea_query::{Alias, Asterisk, Condition, Expr, Func, Order, Query, SelectStatement, SimpleExpr},
};
use serde_json::Value;
use uuid::Uuid;

use crate::core::{Collection, CollectionError, FindQuery, Populate};
use crate::filtering::{Clause, FilterExpression, Operator, SortDirection, coerce_scalar};

const MAX_FIELD_LENGTH: usize = 100;
// SQLite rejects OFFSET without LIMIT
const UNBOUNDED_LIMIT: u64 = 9_223_372_036_854_775_807;

/// How ids passed to [`Collection::find_by_id`] are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdKind {
    #[default]
    Text,
    Integer,
    Uuid,
}

/// Declared storage type of a column, used to bind query-string values.
///
/// Undeclared columns take a number or boolean only when the text reads
/// back unchanged, so `02118` stays a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Boolean,
}

/// A relational table behind the [`Collection`] seam.
///
/// Filters, projection, sort and window are pushed down into a single
/// `SELECT`. Relation expansion is not available.
#[derive(Debug, Clone)]
pub struct SeaCollection {
    db: DatabaseConnection,
    table: String,
    id_column: String,
    id_kind: IdKind,
    column_kinds: HashMap<String, ColumnKind>,
}

impl SeaCollection {
    /// # Errors
    ///
    /// [`CollectionError::InvalidField`] if `table` is not a plain identifier.
    pub fn new(db: DatabaseConnection, table: impl Into<String>) -> Result<Self, CollectionError> {
        let table = table.into();
        validate_field(&table)?;
        Ok(Self {
            db,
            table,
            id_column: "id".to_string(),
            id_kind: IdKind::default(),
            column_kinds: HashMap::new(),
        })
    }

    /// Use another primary key column (default `id`, read as text).
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidField`] if `column` is not a plain identifier.
    pub fn with_id_column(mut self, column: impl Into<String>, kind: IdKind) -> Result<Self, CollectionError> {
        let column = column.into();
        validate_field(&column)?;
        self.id_column = column;
        self.id_kind = kind;
        Ok(self)
    }

    /// Declare how filter values on `column` are bound.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidField`] if `column` is not a plain identifier.
    pub fn with_column_type(
        mut self,
        column: impl Into<String>,
        kind: ColumnKind,
    ) -> Result<Self, CollectionError> {
        let column = column.into();
        validate_field(&column)?;
        self.column_kinds.insert(column, kind);
        Ok(self)
    }

    fn select_statement(&self, query: &FindQuery) -> Result<SelectStatement, CollectionError> {
        if let Some(populate) = query.populates().first() {
            return Err(CollectionError::Unsupported {
                operation: format!("populate '{}' on table {}", populate.path, self.table),
            });
        }

        let mut select = Query::select();
        select.from(Alias::new(&self.table));

        match query.projection() {
            Some(projection) => {
                let mut columns = vec![self.id_column.as_str()];
                columns.extend(
                    projection
                        .fields()
                        .iter()
                        .map(String::as_str)
                        .filter(|field| *field != self.id_column),
                );
                for column in columns {
                    select.column(column_alias(column)?);
                }
            }
            None => {
                select.column(Asterisk);
            }
        }

        select.cond_where(self.condition(query.filter())?);

        if let Some(sort) = query.sort_spec() {
            for key in sort.keys() {
                let order = match key.direction {
                    SortDirection::Asc => Order::Asc,
                    SortDirection::Desc => Order::Desc,
                };
                select.order_by(column_alias(&key.field)?, order);
            }
        }

        match (query.limit_count(), query.skip_count()) {
            (Some(limit), skip) => {
                select.limit(limit).offset(skip);
            }
            (None, 0) => {}
            (None, skip) => {
                select.limit(UNBOUNDED_LIMIT).offset(skip);
            }
        }

        Ok(select)
    }

    fn id_value(&self, id: &str) -> Result<sea_orm::Value, CollectionError> {
        let cast = || CollectionError::Cast {
            collection: self.table.clone(),
            value: id.to_string(),
        };
        Ok(match self.id_kind {
            IdKind::Text => id.to_string().into(),
            IdKind::Integer => id.trim().parse::<i64>().map_err(|_| cast())?.into(),
            IdKind::Uuid => Uuid::parse_str(id.trim()).map_err(|_| cast())?.into(),
        })
    }

    /// Translate a filter expression into a `WHERE` condition; every clause must hold.
    fn condition(&self, filter: &FilterExpression) -> Result<Condition, CollectionError> {
        let mut condition = Condition::all();
        for clause in filter.clauses() {
            let kind = self.column_kinds.get(clause.field()).copied();
            condition = condition.add(clause_expr(&clause, kind)?);
        }
        Ok(condition)
    }

    async fn fetch(&self, select: &SelectStatement) -> Result<Vec<Value>, CollectionError> {
        let backend = self.db.get_database_backend();
        let rows = self.db.query_all(backend.build(select)).await?;
        rows.iter()
            .map(|row| JsonValue::from_query_result(row, "").map_err(CollectionError::from))
            .collect()
    }
}

#[async_trait]
impl Collection for SeaCollection {
    fn name(&self) -> &str {
        &self.table
    }

    async fn find(&self, query: &FindQuery) -> Result<Vec<Value>, CollectionError> {
        let select = self.select_statement(query)?;
        self.fetch(&select).await
    }

    async fn count(&self, filter: Option<&FilterExpression>) -> Result<u64, CollectionError> {
        let mut select = Query::select();
        select
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new("total"))
            .from(Alias::new(&self.table));
        if let Some(filter) = filter {
            select.cond_where(self.condition(filter)?);
        }

        let backend = self.db.get_database_backend();
        let total = match self.db.query_one(backend.build(&select)).await? {
            Some(row) => row.try_get::<i64>("", "total")?,
            None => 0,
        };
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn find_by_id_with(
        &self,
        id: &str,
        populate: Option<&Populate>,
    ) -> Result<Value, CollectionError> {
        if let Some(populate) = populate {
            return Err(CollectionError::Unsupported {
                operation: format!("populate '{}' on table {}", populate.path, self.table),
            });
        }

        let mut select = Query::select();
        select
            .column(Asterisk)
            .from(Alias::new(&self.table))
            .and_where(Expr::col(Alias::new(&self.id_column)).eq(self.id_value(id)?))
            .limit(1);

        self.fetch(&select)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CollectionError::NotFound {
                collection: self.table.clone(),
                id: Some(id.to_string()),
            })
    }
}

fn validate_field(field: &str) -> Result<(), CollectionError> {
    let valid = !field.is_empty()
        && field.len() <= MAX_FIELD_LENGTH
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CollectionError::InvalidField {
            field: field.to_string(),
        })
    }
}

fn column_alias(field: &str) -> Result<Alias, CollectionError> {
    validate_field(field)?;
    Ok(Alias::new(field))
}

fn clause_expr(
    clause: &Clause<'_>,
    kind: Option<ColumnKind>,
) -> Result<SimpleExpr, CollectionError> {
    let column = Expr::col(column_alias(clause.field())?);
    let expr = match *clause {
        Clause::Equals { value: Value::Null, .. } => column.is_null(),
        Clause::Equals { field, value: Value::Array(items) } => {
            column.is_in(sql_values(field, items, kind)?)
        }
        Clause::Equals { field, value } => column.eq(sql_value(field, value, kind)?),
        Clause::Compare { field, operator: Operator::In, value } => match value {
            Value::Array(items) => column.is_in(sql_values(field, items, kind)?),
            other => column.is_in([sql_value(field, other, kind)?]),
        },
        Clause::Compare { field, operator, value } => {
            let value = sql_value(field, value, kind)?;
            match operator {
                Operator::Gt => column.gt(value),
                Operator::Gte => column.gte(value),
                Operator::Lt => column.lt(value),
                Operator::Lte => column.lte(value),
                Operator::In => column.is_in([value]),
            }
        }
    };
    Ok(expr)
}

fn sql_values(
    field: &str,
    items: &[Value],
    kind: Option<ColumnKind>,
) -> Result<Vec<sea_orm::Value>, CollectionError> {
    items.iter().map(|item| sql_value(field, item, kind)).collect()
}

/// Typed form of a query-string scalar for a column of `kind`.
fn typed_scalar(raw: &str, kind: Option<ColumnKind>) -> Value {
    match kind {
        Some(ColumnKind::Text) => Value::String(raw.to_string()),
        Some(ColumnKind::Number | ColumnKind::Boolean) => coerce_scalar(raw),
        None => match coerce_scalar(raw) {
            coerced @ (Value::Number(_) | Value::Bool(_)) if coerced.to_string() == raw.trim() => {
                coerced
            }
            _ => Value::String(raw.to_string()),
        },
    }
}

fn sql_value(
    field: &str,
    value: &Value,
    kind: Option<ColumnKind>,
) -> Result<sea_orm::Value, CollectionError> {
    match value {
        Value::String(raw) => match typed_scalar(raw, kind) {
            Value::String(text) => Ok(text.into()),
            typed => sql_value(field, &typed, kind),
        },
        Value::Bool(flag) => Ok((*flag).into()),
        Value::Number(number) => number
            .as_i64()
            .map(sea_orm::Value::from)
            .or_else(|| number.as_f64().map(sea_orm::Value::from))
            .ok_or_else(|| CollectionError::Unsupported {
                operation: format!("numeric value {number} on '{field}'"),
            }),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(CollectionError::Unsupported {
            operation: format!("nested value filter on '{field}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::{Projection, RawQuery, SortSpec};
    use sea_orm::sea_query::SqliteQueryBuilder;

    fn filter(query: &str) -> FilterExpression {
        FilterExpression::from_raw(&RawQuery::parse(query).unwrap()).unwrap()
    }

    fn courses() -> SeaCollection {
        SeaCollection::new(DatabaseConnection::Disconnected, "courses").unwrap()
    }

    fn where_sql_for(collection: &SeaCollection, query: &str) -> String {
        let mut select = Query::select();
        select
            .column(Asterisk)
            .from(Alias::new("courses"))
            .cond_where(collection.condition(&filter(query)).unwrap());
        select.to_string(SqliteQueryBuilder)
    }

    fn where_sql(query: &str) -> String {
        where_sql_for(&courses(), query)
    }

    #[test]
    fn test_literal_filter() {
        assert_eq!(
            where_sql("title=Front+End"),
            r#"SELECT * FROM "courses" WHERE "title" = 'Front End'"#
        );
    }

    #[test]
    fn test_comparison_values_are_coerced() {
        assert_eq!(
            where_sql("tuition[gte]=8000&tuition[lt]=12000.5"),
            r#"SELECT * FROM "courses" WHERE "tuition" >= 8000 AND "tuition" < 12000.5"#
        );
    }

    #[test]
    fn test_values_that_do_not_read_back_stay_text() {
        assert_eq!(
            where_sql("zipcode=02118&phone=%2B15551234&code[in]=007,42"),
            r#"SELECT * FROM "courses" WHERE "zipcode" = '02118' AND "phone" = '+15551234' AND "code" IN ('007', 42)"#
        );
    }

    #[test]
    fn test_declared_column_types() {
        let collection = courses()
            .with_column_type("title", ColumnKind::Text)
            .unwrap()
            .with_column_type("weeks", ColumnKind::Number)
            .unwrap();
        assert_eq!(
            where_sql_for(&collection, "title=1984&weeks[gte]=08"),
            r#"SELECT * FROM "courses" WHERE "title" = '1984' AND "weeks" >= 8"#
        );
        assert!(courses().with_column_type("bad column", ColumnKind::Text).is_err());
    }

    #[test]
    fn test_membership() {
        assert_eq!(
            where_sql("minimumSkill[in]=beginner,advanced"),
            r#"SELECT * FROM "courses" WHERE "minimumSkill" IN ('beginner', 'advanced')"#
        );
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        assert_eq!(where_sql(""), r#"SELECT * FROM "courses""#);
    }

    #[test]
    fn test_field_names_are_validated() {
        assert!(validate_field("averageCost").is_ok());
        assert!(validate_field("created_at").is_ok());
        assert!(validate_field("").is_err());
        assert!(validate_field("name; DROP TABLE courses").is_err());
        assert!(validate_field("location.state").is_err());
        assert!(validate_field(&"a".repeat(MAX_FIELD_LENGTH + 1)).is_err());

        let raw = RawQuery::parse("ti%22tle=x").unwrap();
        let expression = FilterExpression::from_raw(&raw).unwrap();
        assert!(matches!(
            courses().condition(&expression),
            Err(CollectionError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_nested_values_are_unsupported() {
        assert!(matches!(
            sql_value("location", &serde_json::json!({"state": "MA"}), None),
            Err(CollectionError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_select_statement() {
        let collection = SeaCollection::new(DatabaseConnection::Disconnected, "courses").unwrap();
        let query = FindQuery::new(filter("tuition[lte]=10000"))
            .select(Projection::parse("title,tuition").unwrap())
            .sort(SortSpec::parse("-tuition,title").unwrap())
            .skip(2)
            .limit(2);
        let sql = collection
            .select_statement(&query)
            .unwrap()
            .to_string(SqliteQueryBuilder);
        assert_eq!(
            sql,
            r#"SELECT "id", "title", "tuition" FROM "courses" WHERE "tuition" <= 10000 ORDER BY "tuition" DESC, "title" ASC LIMIT 2 OFFSET 2"#
        );
    }

    #[test]
    fn test_populate_is_unsupported() {
        let collection = SeaCollection::new(DatabaseConnection::Disconnected, "courses").unwrap();
        let query = FindQuery::new(FilterExpression::empty()).populate("bootcamp");
        assert!(matches!(
            collection.select_statement(&query),
            Err(CollectionError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_id_casting() {
        let collection = SeaCollection::new(DatabaseConnection::Disconnected, "courses")
            .unwrap()
            .with_id_column("id", IdKind::Integer)
            .unwrap();
        assert!(collection.id_value("42").is_ok());
        assert!(matches!(
            collection.id_value("abc"),
            Err(CollectionError::Cast { .. })
        ));

        let collection = collection.with_id_column("uuid", IdKind::Uuid).unwrap();
        assert!(collection.id_value(&Uuid::new_v4().to_string()).is_ok());
        assert!(collection.id_value("5d713995b721c3bb38c1f5d0").is_err());
    }

    #[test]
    fn test_invalid_table_name() {
        assert!(SeaCollection::new(DatabaseConnection::Disconnected, "bad table").is_err());
    }
}
