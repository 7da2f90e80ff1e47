//! The data store collaborator. Every call carries the caller's identity;
//! implementations must only read and write rows whose `owner_id` matches
//! it, mirroring the row-level security of the hosted backend.

use std::cmp::Ordering;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::session::Identity;
use crate::AppError;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type Row = Map<String, Value>;

pub const OWNER_COLUMN: &str = "owner_id";

pub(crate) const DOMAIN_TABLES: &[&str] = &[
    "clients",
    "processes",
    "process_subjects",
    "process_actions",
    "process_tasks",
    "task_comments",
    "process_hearings",
    "hearing_comments",
    "process_terms",
    "term_comments",
    "process_meetings",
    "meeting_comments",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown table {0}")]
    UnknownTable(String),
    #[error("invalid column name {0}")]
    InvalidColumn(String),
    #[error("row violates the owner policy of {table}")]
    OwnerPolicy { table: String },
    #[error("{table} row {id} not found")]
    NotFound { table: String, id: String },
    #[error("data store request failed: {0}")]
    Transport(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownTable(_) => "STORE/UNKNOWN_TABLE",
            StoreError::InvalidColumn(_) => "STORE/INVALID_COLUMN",
            StoreError::OwnerPolicy { .. } => "STORE/OWNER_POLICY",
            StoreError::NotFound { .. } => "STORE/NOT_FOUND",
            StoreError::Transport(_) => "STORE/TRANSPORT",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        AppError::new(error.code(), error.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Transport(AppError::from(error).to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Equality filters plus an optional single-column ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, SortDirection)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((column.into(), direction));
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|(column, value)| row.get(column).unwrap_or(&Value::Null) == value)
    }

    fn columns(&self) -> impl Iterator<Item = &str> {
        self.filters
            .iter()
            .map(|(c, _)| c.as_str())
            .chain(self.order_by.iter().map(|(c, _)| c.as_str()))
    }
}

/// Remote relational store reached over the network. Each call is one
/// round trip; `insert` is all-or-nothing for the whole batch.
pub trait DataStore: Send + Sync {
    fn insert<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        rows: Vec<Row>,
    ) -> BoxFuture<'a, Result<Vec<Row>, StoreError>>;

    fn select<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        query: &'a Query,
    ) -> BoxFuture<'a, Result<Vec<Row>, StoreError>>;

    fn update<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        id: &'a str,
        patch: Row,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    fn delete<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>>;
}

pub(crate) fn ensure_table(table: &str) -> Result<(), StoreError> {
    if DOMAIN_TABLES.contains(&table) {
        Ok(())
    } else {
        Err(StoreError::UnknownTable(table.to_string()))
    }
}

pub(crate) fn ensure_column(column: &str) -> Result<(), StoreError> {
    let valid = !column.is_empty()
        && column
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidColumn(column.to_string()))
    }
}

pub(crate) fn ensure_query(query: &Query) -> Result<(), StoreError> {
    query.columns().try_for_each(ensure_column)
}

/// Every row must already carry the caller's `owner_id`.
pub(crate) fn ensure_owned(identity: &Identity, table: &str, row: &Row) -> Result<(), StoreError> {
    match row.get(OWNER_COLUMN).and_then(Value::as_str) {
        Some(owner) if owner == identity.user_id => Ok(()),
        _ => Err(StoreError::OwnerPolicy {
            table: table.to_string(),
        }),
    }
}

/// Total order over JSON scalars used for in-memory sorting: nulls first,
/// then booleans, numbers and strings.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_matches_on_all_filters() {
        let row = json!({"process_id": "p1", "status": "pending"});
        let row = row.as_object().expect("object").clone();
        assert!(Query::new().eq("process_id", "p1").matches(&row));
        assert!(!Query::new()
            .eq("process_id", "p1")
            .eq("status", "completed")
            .matches(&row));
        assert!(!Query::new().eq("missing", "x").matches(&row));
    }

    #[test]
    fn column_names_are_restricted() {
        assert!(ensure_column("action_date").is_ok());
        assert!(ensure_column("action_date; DROP TABLE clients").is_err());
        assert!(ensure_column("").is_err());
        assert!(ensure_table("process_actions").is_ok());
        assert!(matches!(
            ensure_table("schema_migrations"),
            Err(StoreError::UnknownTable(_))
        ));
    }

    #[test]
    fn owner_policy_requires_matching_owner() {
        let identity = Identity::new("u1", "u1@bufete.co");
        let mine = json!({"owner_id": "u1"}).as_object().cloned().expect("object");
        let theirs = json!({"owner_id": "u2"}).as_object().cloned().expect("object");
        assert!(ensure_owned(&identity, "clients", &mine).is_ok());
        assert!(ensure_owned(&identity, "clients", &theirs).is_err());
    }

    #[test]
    fn values_sort_nulls_first() {
        let mut values = vec![json!("b"), json!(null), json!(3), json!("a")];
        values.sort_by(compare_values);
        assert_eq!(values, vec![json!(null), json!(3), json!("a"), json!("b")]);
    }

    #[test]
    fn direction_reverses_ordering() {
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
    }
}
