use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{query::Query as SqlxQuery, Column, Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};

use super::{
    ensure_column, ensure_owned, ensure_query, ensure_table, DataStore, Query, Row, StoreError,
    OWNER_COLUMN,
};
use crate::session::Identity;

/// SQLite-backed implementation of the data store, used by the command
/// line tool against a local database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert_rows(
        &self,
        identity: &Identity,
        table: &str,
        rows: Vec<Row>,
    ) -> Result<Vec<Row>, StoreError> {
        ensure_table(table)?;
        for row in &rows {
            ensure_owned(identity, table, row)?;
        }

        let mut tx = self.pool.begin().await?;
        for row in &rows {
            let cols: Vec<&String> = row.keys().collect();
            cols.iter().try_for_each(|c| ensure_column(c))?;
            let placeholders: Vec<&str> = cols.iter().map(|_| "?").collect();
            let sql = format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                cols.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(","),
                placeholders.join(",")
            );
            let mut query = sqlx::query(&sql);
            for value in row.values() {
                query = bind_value(query, value);
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(target: "lexdesk", event = "store_insert", table, rows = rows.len());
        Ok(rows)
    }

    async fn select_rows(
        &self,
        identity: &Identity,
        table: &str,
        query: &Query,
    ) -> Result<Vec<Row>, StoreError> {
        ensure_table(table)?;
        ensure_query(query)?;

        let mut sql = format!("SELECT * FROM {table} WHERE {OWNER_COLUMN} = ?");
        for (column, value) in &query.filters {
            if value.is_null() {
                sql.push_str(&format!(" AND {column} IS NULL"));
            } else {
                sql.push_str(&format!(" AND {column} = ?"));
            }
        }
        if let Some((column, direction)) = &query.order_by {
            sql.push_str(&format!(" ORDER BY {column} {}", direction.as_sql()));
        }

        let mut q = sqlx::query(&sql).bind(identity.user_id.clone());
        for (_, value) in query.filters.iter().filter(|(_, v)| !v.is_null()) {
            q = bind_value(q, value);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(row_to_map).collect())
    }

    async fn update_row(
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
        if patch.is_empty() {
            let sql = format!("SELECT 1 FROM {table} WHERE id = ? AND {OWNER_COLUMN} = ?");
            let found = sqlx::query(&sql)
                .bind(id.to_string())
                .bind(identity.user_id.clone())
                .fetch_optional(&self.pool)
                .await?;
            return match found {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound {
                    table: table.to_string(),
                    id: id.to_string(),
                }),
            };
        }
        patch.keys().try_for_each(|c| ensure_column(c))?;

        let set_clause: Vec<String> = patch.keys().map(|c| format!("{c} = ?")).collect();
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ? AND {OWNER_COLUMN} = ?",
            set_clause.join(",")
        );
        let mut query = sqlx::query(&sql);
        for value in patch.values() {
            query = bind_value(query, value);
        }
        let res = query
            .bind(id.to_string())
            .bind(identity.user_id.clone())
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_row(&self, identity: &Identity, table: &str, id: &str) -> Result<(), StoreError> {
        ensure_table(table)?;
        let sql = format!("DELETE FROM {table} WHERE id = ? AND {OWNER_COLUMN} = ?");
        let res = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(identity.user_id.clone())
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl DataStore for SqliteStore {
    fn insert<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        rows: Vec<Row>,
    ) -> BoxFuture<'a, Result<Vec<Row>, StoreError>> {
        self.insert_rows(identity, table, rows).boxed()
    }

    fn select<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        query: &'a Query,
    ) -> BoxFuture<'a, Result<Vec<Row>, StoreError>> {
        self.select_rows(identity, table, query).boxed()
    }

    fn update<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        id: &'a str,
        patch: Row,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        self.update_row(identity, table, id, patch).boxed()
    }

    fn delete<'a>(
        &'a self,
        identity: &'a Identity,
        table: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        self.delete_row(identity, table, id).boxed()
    }
}

fn row_to_map(row: SqliteRow) -> Row {
    let mut map = Map::new();
    for col in row.columns() {
        let idx = col.ordinal();
        let val = match row.try_get_raw(idx).ok() {
            Some(raw) if !raw.is_null() => match raw.type_info().name() {
                "INTEGER" => row
                    .try_get::<i64, _>(idx)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                "REAL" => row
                    .try_get::<f64, _>(idx)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                _ => row
                    .try_get::<String, _>(idx)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
            },
            _ => Value::Null,
        };
        map.insert(col.name().to_string(), val);
    }
    map
}

fn bind_value<'q>(
    q: SqlxQuery<'q, Sqlite, SqliteArguments<'q>>,
    v: &Value,
) -> SqlxQuery<'q, Sqlite, SqliteArguments<'q>> {
    match v {
        Value::Null => q.bind(Option::<String>::None),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(Option::<i64>::None)
            }
        }
        Value::Bool(b) => q.bind(*b as i64),
        Value::String(s) => q.bind(s.clone()),
        _ => q.bind(v.to_string()),
    }
}
