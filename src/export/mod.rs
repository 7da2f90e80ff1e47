//! Downloadable CSV files: the cross-process "formatos" exports and the
//! blank action import template.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::csv::{write_quoted_row, write_table};
use crate::model::{AgendaItem, AgendaKind, Status};
use crate::AppError;

mod columns;

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";
pub const TEMPLATE_CONTENT_TYPE: &str = "text/csv";
pub const ACTION_TEMPLATE_FILENAME: &str = "plantilla_actuaciones.csv";

/// Header labels of the action import template.
pub const ACTION_TEMPLATE_LABELS: &[&str] = &[
    "Fecha de Actuación",
    "Actuación",
    "Anotación",
    "Fecha Inicia Término",
    "Fecha Finaliza Término",
];

/// A generated file offered to the user for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvFile {
    pub filename: String,
    pub content_type: String,
    pub body: String,
}

impl CsvFile {
    /// Writes the file under `dir`, replacing any previous download.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, AppError> {
        fs::create_dir_all(dir).map_err(|err| {
            AppError::from(err)
                .with_context("operation", "create_export_dir")
                .with_context("path", dir.display().to_string())
        })?;
        let path = dir.join(&self.filename);
        fs::write(&path, self.body.as_bytes()).map_err(|err| {
            AppError::from(err)
                .with_context("operation", "write_export")
                .with_context("path", path.display().to_string())
        })?;
        Ok(path)
    }
}

/// Sheets offered by the formats view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Tasks,
    Hearings,
    Terms,
}

impl Format {
    pub fn kind(self) -> AgendaKind {
        match self {
            Format::Tasks => AgendaKind::Task,
            Format::Hearings => AgendaKind::Hearing,
            Format::Terms => AgendaKind::Term,
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            Format::Tasks => "tareas.csv",
            Format::Hearings => "audiencias.csv",
            Format::Terms => "terminos.csv",
        }
    }

    pub fn labels(self) -> &'static [&'static str] {
        columns::labels(self)
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tasks" | "tareas" => Ok(Format::Tasks),
            "hearings" | "audiencias" => Ok(Format::Hearings),
            "terms" | "terminos" => Ok(Format::Terms),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

/// `all` or a single status, as picked in the formats view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn allows(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// Serializes the items that pass `filter`, in the given order.
pub fn export_format(format: Format, items: &[AgendaItem], filter: StatusFilter) -> CsvFile {
    let rows: Vec<Vec<String>> = items
        .iter()
        .filter(|item| filter.allows(item.status))
        .map(|item| columns::project(format, item))
        .collect();
    info!(
        target: "lexdesk",
        event = "export_built",
        file = format.filename(),
        rows = rows.len()
    );
    CsvFile {
        filename: format.filename().to_string(),
        content_type: CSV_CONTENT_TYPE.to_string(),
        body: write_table(format.labels(), &rows),
    }
}

/// Blank sheet with the quoted canonical header row.
pub fn action_template() -> CsvFile {
    CsvFile {
        filename: ACTION_TEMPLATE_FILENAME.to_string(),
        content_type: TEMPLATE_CONTENT_TYPE.to_string(),
        body: write_quoted_row(ACTION_TEMPLATE_LABELS),
    }
}
