#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use lexdesk_lib::store::{Row, SqliteStore};
use lexdesk_lib::{db, migrate, Identity, Session};
use serde_json::Value;

pub const SAMPLE_SHEET: &str = "\"Fecha de Actuación\",\"Actuación\",\"Anotación\"\n\"01/02/2024\",\"Auto admite demanda\",\"Ninguna\"\n";

pub async fn migrated_store() -> SqliteStore {
    let pool = db::open_memory_pool().await.expect("open in-memory pool");
    migrate::apply_migrations(&pool)
        .await
        .expect("apply migrations");
    SqliteStore::new(pool)
}

pub fn session(user: &str) -> Session {
    Session::authenticated(Identity::new(user, format!("{user}@bufete.co")))
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().expect("object literal")
}
