use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;

use super::{
    compare_values, ensure_column, ensure_owned, ensure_query, ensure_table, DataStore, Query,
    Row, StoreError, OWNER_COLUMN,
};
use crate::session::Identity;

/// In-process stand-in for the hosted backend, used by tests and dry runs.
/// Enforces the same owner policy and batch atomicity as the real store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<String, Vec<Row>>>,
    insert_calls: AtomicUsize,
    fail_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `insert` round trips received, successful or not.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Makes every following `insert` fail with a transport error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Rows of a table regardless of owner.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.get(table).cloned().unwrap_or_default()
    }

    fn insert_now(
        &self,
        identity: &Identity,
        table: &str,
        rows: Vec<Row>,
    ) -> Result<Vec<Row>, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        ensure_table(table)?;
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection reset".into()));
        }
        for row in &rows {
            ensure_owned(identity, table, row)?;
            row.keys().try_for_each(|c| ensure_column(c))?;
        }
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables
            .entry(table.to_string())
            .or_default()
            .extend(rows.iter().cloned());
        Ok(rows)
    }

    fn select_now(
        &self,
        identity: &Identity,
        table: &str,
        query: &Query,
    ) -> Result<Vec<Row>, StoreError> {
        ensure_table(table)?;
        ensure_query(query)?;
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| owned_by(row, identity) && query.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some((column, direction)) = &query.order_by {
            rows.sort_by(|a, b| {
                let a = a.get(column).unwrap_or(&Value::Null);
                let b = b.get(column).unwrap_or(&Value::Null);
                direction.apply(compare_values(a, b))
            });
        }
        Ok(rows)
    }

    fn update_now(
        &self,
        identity: &Identity,
        table: &str,
        id: &str,
        mut patch: Row,
    ) -> Result<(), StoreError> {
        ensure_table(table)?;
        patch.remove("id");
        patch.remove(OWNER_COLUMN);
        patch.remove("created_at");
        patch.keys().try_for_each(|c| ensure_column(c))?;
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let row = tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| owned_by(row, identity) && has_id(row, id))
            })
            .ok_or_else(|| not_found(table, id))?;
        row.extend(patch);
        Ok(())
    }

    fn delete_now(&self, identity: &Identity, table: &str, id: &str) -> Result<(), StoreError> {
        ensure_table(table)?;
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let rows = tables.get_mut(table).ok_or_else(|| not_found(table, id))?;
        let before = rows.len();
        rows.retain(|row| !(owned_by(row, identity) && has_id(row, id)));
        if rows.len() == before {
            return Err(not_found(table, id));
        }
        Ok(())
    }
}

fn owned_by(row: &Row, identity: &Identity) -> bool {
    row.get(OWNER_COLUMN).and_then(Value::as_str) == Some(identity.user_id.as_str())
}

fn has_id(row: &Row, id: &str) -> bool {
    row.get("id").and_then(Value::as_str) == Some(id)
}

fn not_found(table: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        table: table.to_string(),
        id: id.to_string(),
    }
}

impl DataStore for MemoryStore {
    fn insert<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        rows: Vec<Row>,
    ) -> BoxFuture<'a, Result<Vec<Row>, StoreError>> {
        future::ready(self.insert_now(identity, table, rows)).boxed()
    }

    fn select<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        query: &'a Query,
    ) -> BoxFuture<'a, Result<Vec<Row>, StoreError>> {
        future::ready(self.select_now(identity, table, query)).boxed()
    }

    fn update<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        id: &'a str,
        patch: Row,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        future::ready(self.update_now(identity, table, id, patch)).boxed()
    }

    fn delete<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        future::ready(self.delete_now(identity, table, id)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortDirection;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().expect("object")
    }

    fn ana() -> Identity {
        Identity::new("u-ana", "ana@bufete.co")
    }

    #[tokio::test]
    async fn batch_with_foreign_owner_inserts_nothing() {
        let store = MemoryStore::new();
        let rows = vec![
            row(json!({"id": "a1", "owner_id": "u-ana", "action": "uno"})),
            row(json!({"id": "a2", "owner_id": "u-otro", "action": "dos"})),
        ];
        let err = store
            .insert(&ana(), "process_actions", rows)
            .await
            .expect_err("policy violation");
        assert!(matches!(err, StoreError::OwnerPolicy { .. }));
        assert!(store.rows("process_actions").is_empty());
        assert_eq!(store.insert_calls(), 1);
    }

    #[tokio::test]
    async fn select_scopes_to_owner_and_sorts() {
        let store = MemoryStore::new();
        let other = Identity::new("u-otro", "otro@bufete.co");
        store
            .insert(
                &ana(),
                "clients",
                vec![
                    row(json!({"id": "c1", "owner_id": "u-ana", "name": "Beta"})),
                    row(json!({"id": "c2", "owner_id": "u-ana", "name": "Alfa"})),
                ],
            )
            .await
            .expect("insert");
        store
            .insert(
                &other,
                "clients",
                vec![row(json!({"id": "c3", "owner_id": "u-otro", "name": "Gama"}))],
            )
            .await
            .expect("insert");

        let query = Query::new().order("name", SortDirection::Asc);
        let names: Vec<String> = store
            .select(&ana(), "clients", &query)
            .await
            .expect("select")
            .into_iter()
            .filter_map(|r| r.get("name").and_then(Value::as_str).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["Alfa", "Beta"]);
    }

    #[tokio::test]
    async fn update_and_delete_respect_owner() {
        let store = MemoryStore::new();
        let other = Identity::new("u-otro", "otro@bufete.co");
        store
            .insert(
                &ana(),
                "clients",
                vec![row(json!({"id": "c1", "owner_id": "u-ana", "name": "Beta"}))],
            )
            .await
            .expect("insert");

        let patch = row(json!({"name": "Beta SAS", "owner_id": "u-otro"}));
        assert!(store.update(&other, "clients", "c1", patch.clone()).await.is_err());
        store
            .update(&ana(), "clients", "c1", patch)
            .await
            .expect("update");
        let stored = store.rows("clients");
        assert_eq!(stored[0]["name"], "Beta SAS");
        assert_eq!(stored[0]["owner_id"], "u-ana");

        assert!(store.delete(&other, "clients", "c1").await.is_err());
        store.delete(&ana(), "clients", "c1").await.expect("delete");
        assert!(store.rows("clients").is_empty());
    }

    #[tokio::test]
    async fn injected_failure_is_a_transport_error() {
        let store = MemoryStore::new();
        store.fail_inserts(true);
        let err = store
            .insert(
                &ana(),
                "clients",
                vec![row(json!({"id": "c1", "owner_id": "u-ana"}))],
            )
            .await
            .expect_err("failure injected");
        assert_eq!(err.code(), "STORE/TRANSPORT");
    }
}
