//! Bulk import of process actions from a CSV sheet.
//!
//! The whole file is parsed and validated before anything is sent: a single
//! bad row aborts the import and the store is left untouched. Valid files
//! are submitted as one batch insert.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::csv::non_blank_lines;
use crate::model::{action, NewProcessAction};
use crate::session::{Session, SessionError};
use crate::store::{DataStore, Row, StoreError};
use crate::{id::new_uuid_v7, time::now_rfc3339, AppError};

mod rows;

pub use rows::RowContext;
use rows::ActionHeader;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("El archivo CSV debe contener al menos un encabezado y una fila de datos")]
    Format,
    #[error("El CSV debe contener al menos las columnas \"Fecha de Actuación\" y \"Actuación\"")]
    MissingRequiredColumn { headers: Vec<String> },
    #[error("Todas las filas deben tener fecha de actuación y actuación (fila {line}: {row})")]
    RowMissingRequired { line: usize, row: String },
    #[error("Formato de fecha inválido en la fila: {row}")]
    RowInvalidDate { line: usize, row: String },
    #[error("No se pudo leer el archivo {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("Error al importar actuaciones: {0}")]
    Transport(StoreError),
    #[error("Debes iniciar sesión para importar actuaciones")]
    Unauthenticated(#[from] SessionError),
}

impl ImportError {
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::Format => "IMPORT/FORMAT",
            ImportError::MissingRequiredColumn { .. } => "IMPORT/MISSING_COLUMN",
            ImportError::RowMissingRequired { .. } | ImportError::RowInvalidDate { .. } => {
                "IMPORT/ROW_VALIDATION"
            }
            ImportError::Read { .. } => "IMPORT/READ",
            ImportError::Transport(_) => "IMPORT/TRANSPORT",
            ImportError::Unauthenticated(_) => "AUTH/REQUIRED",
        }
    }

    /// 1-based line of the offending row, for row validation failures.
    pub fn line(&self) -> Option<usize> {
        match self {
            ImportError::RowMissingRequired { line, .. }
            | ImportError::RowInvalidDate { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<ImportError> for AppError {
    fn from(error: ImportError) -> Self {
        let mut app = AppError::new(error.code(), error.to_string());
        if let Some(line) = error.line() {
            app = app.with_context("line", line.to_string());
        }
        match error {
            ImportError::MissingRequiredColumn { headers } => {
                app.with_context("headers", headers.join(","))
            }
            ImportError::Transport(source) => app.with_cause(source),
            _ => app,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub process_id: String,
    pub inserted: usize,
}

/// Parses a whole sheet into records without touching the store.
pub fn parse_actions(text: &str, ctx: RowContext<'_>) -> Result<Vec<NewProcessAction>, ImportError> {
    let lines = non_blank_lines(text);
    if lines.len() < 2 {
        return Err(ImportError::Format);
    }

    let header = ActionHeader::parse(lines[0])?;
    lines[1..]
        .iter()
        .enumerate()
        .map(|(offset, line)| header.materialize(line, offset + 2, ctx))
        .collect()
}

/// Parses `text` and batch-inserts the resulting actions for `process_id`
/// on behalf of the signed-in user.
pub async fn import_actions<S>(
    store: &S,
    session: &Session,
    process_id: &str,
    text: &str,
) -> Result<ImportOutcome, ImportError>
where
    S: DataStore + ?Sized,
{
    let identity = session.identity()?;
    info!(target: "lexdesk", event = "import_started", process_id, bytes = text.len());

    let ctx = RowContext {
        process_id,
        owner_id: &identity.user_id,
    };
    let records = parse_actions(text, ctx).map_err(|err| {
        error!(target: "lexdesk", event = "import_rejected", process_id, code = err.code(), error = %err);
        err
    })?;
    info!(target: "lexdesk", event = "import_rows_materialized", process_id, rows = records.len());

    let created_at = now_rfc3339();
    let rows: Vec<Row> = records
        .into_iter()
        .map(|record| to_row(record, &created_at))
        .collect();
    let inserted = rows.len();

    store
        .insert(identity, action::TABLE, rows)
        .await
        .map_err(|err| {
            error!(target: "lexdesk", event = "import_transport_failed", process_id, error = %err);
            ImportError::Transport(err)
        })?;

    info!(target: "lexdesk", event = "import_inserted", process_id, rows = inserted);
    Ok(ImportOutcome {
        process_id: process_id.to_string(),
        inserted,
    })
}

/// Reads the file into memory, then behaves like [`import_actions`].
pub async fn import_actions_file<S>(
    store: &S,
    session: &Session,
    process_id: &str,
    path: &Path,
) -> Result<ImportOutcome, ImportError>
where
    S: DataStore + ?Sized,
{
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| ImportError::Read {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
    import_actions(store, session, process_id, &text).await
}

fn to_row(record: NewProcessAction, created_at: &str) -> Row {
    let mut row = match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Row::new(),
    };
    row.insert("id".into(), Value::String(new_uuid_v7()));
    row.insert("created_at".into(), Value::String(created_at.to_string()));
    row
}
