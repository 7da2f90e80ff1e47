use tracing::warn;

use super::ImportError;
use crate::csv::{tokenize_line, ColumnMap, ColumnResolution};
use crate::model::NewProcessAction;
use crate::time::{parse_record_date, to_storage};

/// Normalized header text accepted for each canonical action column.
pub(crate) const ACTION_COLUMNS: ColumnMap = ColumnMap::new(&[
    ("fecha de actuacion", "action_date"),
    ("fecha actuacion", "action_date"),
    ("actuacion", "action"),
    ("anotacion", "annotation"),
    ("fecha inicia termino", "term_start_date"),
    ("fecha finaliza termino", "term_end_date"),
]);

/// Caller-supplied values that never come from the file.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub process_id: &'a str,
    pub owner_id: &'a str,
}

/// Header row resolved against the action columns, with the positions of
/// the two mandatory columns located.
#[derive(Debug, Clone)]
pub(crate) struct ActionHeader {
    columns: ColumnResolution,
    date_index: usize,
    action_index: usize,
}

impl ActionHeader {
    pub(crate) fn parse(line: &str) -> Result<Self, ImportError> {
        let columns = ACTION_COLUMNS.resolve(&tokenize_line(line));
        let date_index = columns.position(|h| h.contains("fecha") && h.contains("actuacion"));
        let action_index = columns.position(|h| h == "actuacion");
        match (date_index, action_index) {
            (Some(date_index), Some(action_index)) => Ok(Self {
                columns,
                date_index,
                action_index,
            }),
            _ => Err(ImportError::MissingRequiredColumn {
                headers: columns.normalized().to_vec(),
            }),
        }
    }

    /// Builds one record from a data line. `line_number` is 1-based over the
    /// non-blank lines, so the first data row is line 2.
    pub(crate) fn materialize(
        &self,
        line: &str,
        line_number: usize,
        ctx: RowContext<'_>,
    ) -> Result<NewProcessAction, ImportError> {
        let values = tokenize_line(line);
        let value_at = |index: usize| values.get(index).map(String::as_str).unwrap_or("");

        let raw_date = value_at(self.date_index);
        let action = value_at(self.action_index);
        if raw_date.is_empty() || action.is_empty() {
            return Err(ImportError::RowMissingRequired {
                line: line_number,
                row: line.to_string(),
            });
        }

        let action_date = parse_record_date(raw_date).ok_or_else(|| ImportError::RowInvalidDate {
            line: line_number,
            row: line.to_string(),
        })?;

        let mut record = NewProcessAction {
            process_id: ctx.process_id.to_string(),
            owner_id: ctx.owner_id.to_string(),
            action_date: to_storage(action_date),
            action: action.to_string(),
            annotation: None,
            term_start_date: None,
            term_end_date: None,
        };

        for index in 0..self.columns.len() {
            if index == self.date_index || index == self.action_index {
                continue;
            }
            let Some(key) = self.columns.key_at(index) else {
                continue;
            };
            let value = value_at(index);
            if value.is_empty() {
                continue;
            }
            if key.ends_with("_date") {
                match parse_record_date(value) {
                    Some(date) => record.set_optional(key, to_storage(date)),
                    None => warn!(
                        target: "lexdesk",
                        event = "optional_date_dropped",
                        line = line_number,
                        column = key,
                        value
                    ),
                }
            } else {
                record.set_optional(key, value.to_string());
            }
        }

        Ok(record)
    }
}
