//! Field schemas for every record the dashboard creates or edits, with a
//! single validator shared by all of them.

use serde_json::Value;
use thiserror::Error;

use crate::model::AgendaKind;
use crate::store::Row;
use crate::time::{parse_record_date, to_storage};
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Date,
    Number,
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }

    const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("El campo \"{label}\" es obligatorio")]
    Required { key: &'static str, label: &'static str },
    #[error("El campo \"{label}\" debe ser una fecha válida")]
    InvalidDate {
        key: &'static str,
        label: &'static str,
        value: String,
    },
    #[error("El campo \"{label}\" debe ser un número entero")]
    InvalidNumber {
        key: &'static str,
        label: &'static str,
        value: String,
    },
    #[error("El campo \"{label}\" debe ser un correo electrónico válido")]
    InvalidEmail {
        key: &'static str,
        label: &'static str,
        value: String,
    },
    #[error("El valor de \"{label}\" no es una opción válida")]
    InvalidChoice {
        key: &'static str,
        label: &'static str,
        value: String,
    },
}

impl FormError {
    pub fn code(&self) -> &'static str {
        match self {
            FormError::Required { .. } => "FORM/REQUIRED",
            FormError::InvalidDate { .. } => "FORM/INVALID_DATE",
            FormError::InvalidNumber { .. } => "FORM/INVALID_NUMBER",
            FormError::InvalidEmail { .. } => "FORM/INVALID_EMAIL",
            FormError::InvalidChoice { .. } => "FORM/INVALID_CHOICE",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            FormError::Required { key, .. }
            | FormError::InvalidDate { key, .. }
            | FormError::InvalidNumber { key, .. }
            | FormError::InvalidEmail { key, .. }
            | FormError::InvalidChoice { key, .. } => *key,
        }
    }
}

impl From<FormError> for AppError {
    fn from(error: FormError) -> Self {
        let app = AppError::new(error.code(), error.to_string()).with_context("field", error.key());
        match &error {
            FormError::Required { .. } => app,
            FormError::InvalidDate { value, .. }
            | FormError::InvalidNumber { value, .. }
            | FormError::InvalidEmail { value, .. }
            | FormError::InvalidChoice { value, .. } => app.with_context("value", value.clone()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct FormSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    /// Values filled in when the input leaves a field blank.
    pub defaults: &'static [(&'static str, &'static str)],
}

impl FormSchema {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Checks `input` against the schema and returns the row to store.
    ///
    /// Only schema keys are kept. Text is trimmed, blank optional fields
    /// become `null`, dates are stored as `YYYY-MM-DD` and numbers as
    /// integers. The first failing field, in schema order, is reported.
    pub fn validate(&self, input: &Row) -> Result<Row, FormError> {
        let mut out = Row::new();
        for field in self.fields {
            let raw = input.get(field.key).map(text_of).unwrap_or_default();
            let mut value = raw.trim();
            if value.is_empty() {
                if let Some((_, default)) = self.defaults.iter().find(|(k, _)| *k == field.key) {
                    value = *default;
                }
            }
            out.insert(field.key.to_string(), check(field, value)?);
        }
        Ok(out)
    }

    /// Like [`FormSchema::validate`], but only for the keys present in
    /// `input`. Absent fields are left out of the result and defaults are
    /// not applied, so the stored values of untouched fields survive.
    pub fn validate_patch(&self, input: &Row) -> Result<Row, FormError> {
        let mut out = Row::new();
        for field in self.fields {
            let Some(raw) = input.get(field.key) else {
                continue;
            };
            let raw = text_of(raw);
            out.insert(field.key.to_string(), check(field, raw.trim())?);
        }
        Ok(out)
    }
}

fn check(field: &FieldSpec, value: &str) -> Result<Value, FormError> {
    if value.is_empty() {
        if field.required {
            return Err(FormError::Required {
                key: field.key,
                label: field.label,
            });
        }
        return Ok(Value::Null);
    }
    convert(field, value)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn convert(field: &FieldSpec, value: &str) -> Result<Value, FormError> {
    match field.kind {
        FieldKind::Text | FieldKind::TextArea => Ok(Value::String(value.to_string())),
        FieldKind::Email => {
            let valid = value
                .split_once('@')
                .map(|(user, domain)| !user.is_empty() && !domain.is_empty())
                .unwrap_or(false);
            if valid {
                Ok(Value::String(value.to_string()))
            } else {
                Err(FormError::InvalidEmail {
                    key: field.key,
                    label: field.label,
                    value: value.to_string(),
                })
            }
        }
        FieldKind::Date => parse_record_date(value)
            .map(|date| Value::String(to_storage(date)))
            .ok_or_else(|| FormError::InvalidDate {
                key: field.key,
                label: field.label,
                value: value.to_string(),
            }),
        FieldKind::Number => value
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| FormError::InvalidNumber {
                key: field.key,
                label: field.label,
                value: value.to_string(),
            }),
        FieldKind::Choice(options) => {
            if options.contains(&value) {
                Ok(Value::String(value.to_string()))
            } else {
                Err(FormError::InvalidChoice {
                    key: field.key,
                    label: field.label,
                    value: value.to_string(),
                })
            }
        }
    }
}

pub const SUBJECT_TYPES: &[&str] = &[
    "Demandante",
    "Demandado",
    "Tercero Interviniente",
    "Coadyuvante",
    "Ministerio Público",
    "Otro",
];

const PRIORITIES: &[&str] = &["low", "medium", "high"];
const STATUSES: &[&str] = &["pending", "in_progress", "completed"];
const AGENDA_DEFAULTS: &[(&str, &str)] = &[("priority", "medium"), ("status", "pending")];

use self::FieldKind::{Choice, Date, Email, Number, Text, TextArea};

pub static CLIENT: FormSchema = FormSchema {
    name: "client",
    fields: &[
        FieldSpec::required("name", "Nombre", Text),
        FieldSpec::required("email", "Correo Electrónico", Email),
        FieldSpec::optional("description", "Descripción", TextArea),
    ],
    defaults: &[],
};

pub static PROCESS: FormSchema = FormSchema {
    name: "process",
    fields: &[
        FieldSpec::required("client_id", "Cliente", Text),
        FieldSpec::optional("filing_number", "Radicado", Text),
        FieldSpec::required("filing_date", "Fecha de Radicación", Date),
        FieldSpec::required("court", "Despacho", Text),
        FieldSpec::required("judge", "Ponente", Text),
        FieldSpec::required("process_type", "Tipo de Proceso", Text),
        FieldSpec::required("process_class", "Clase de Proceso", Text),
        FieldSpec::required("process_subclass", "Subclase de Proceso", Text),
        FieldSpec::optional("documents_url", "URL de Documentos", Text),
        FieldSpec::optional("resource", "Recurso", Text),
        FieldSpec::optional("file_location", "Ubicación del Expediente", Text),
        FieldSpec::optional("filing_content", "Contenido de Radicación", TextArea),
    ],
    defaults: &[],
};

pub static SUBJECT: FormSchema = FormSchema {
    name: "subject",
    fields: &[
        FieldSpec::required("type", "Tipo", Choice(SUBJECT_TYPES)),
        FieldSpec::required("name", "Nombre", Text),
    ],
    defaults: &[],
};

pub static ACTION: FormSchema = FormSchema {
    name: "action",
    fields: &[
        FieldSpec::required("action_date", "Fecha de Actuación", Date),
        FieldSpec::required("action", "Actuación", TextArea),
        FieldSpec::optional("annotation", "Anotación", TextArea),
        FieldSpec::optional("term_start_date", "Fecha Inicia Término", Date),
        FieldSpec::optional("term_end_date", "Fecha Finaliza Término", Date),
    ],
    defaults: &[],
};

pub static TASK: FormSchema = FormSchema {
    name: "task",
    fields: &[
        FieldSpec::required("name", "Nombre", Text),
        FieldSpec::optional("description", "Descripción", TextArea),
        FieldSpec::optional("due_date", "Fecha Límite", Date),
        FieldSpec::optional("priority", "Prioridad", Choice(PRIORITIES)),
        FieldSpec::optional("status", "Estado", Choice(STATUSES)),
        FieldSpec::optional("responsable", "Responsable", Text),
    ],
    defaults: AGENDA_DEFAULTS,
};

pub static HEARING: FormSchema = FormSchema {
    name: "hearing",
    fields: &[
        FieldSpec::required("name", "Nombre", Text),
        FieldSpec::optional("description", "Descripción", TextArea),
        FieldSpec::optional("hearing_status", "Estado de la Audiencia", Text),
        FieldSpec::optional("due_date", "Fecha", Date),
        FieldSpec::optional("priority", "Prioridad", Choice(PRIORITIES)),
        FieldSpec::optional("status", "Estado", Choice(STATUSES)),
        FieldSpec::optional("responsable", "Responsable", Text),
    ],
    defaults: AGENDA_DEFAULTS,
};

pub static TERM: FormSchema = FormSchema {
    name: "term",
    fields: &[
        FieldSpec::required("name", "Nombre", Text),
        FieldSpec::optional("description", "Descripción", TextArea),
        FieldSpec::required("days_term", "Término (días)", Number),
        FieldSpec::optional("notification_date", "Fecha de Notificación", Date),
        FieldSpec::optional("due_date", "Fecha de Vencimiento", Date),
        FieldSpec::optional("priority", "Prioridad", Choice(PRIORITIES)),
        FieldSpec::optional("status", "Estado", Choice(STATUSES)),
        FieldSpec::optional("responsable", "Responsable", Text),
    ],
    defaults: AGENDA_DEFAULTS,
};

pub static MEETING: FormSchema = FormSchema {
    name: "meeting",
    fields: &[
        FieldSpec::required("name", "Nombre", Text),
        FieldSpec::optional("description", "Descripción", TextArea),
        FieldSpec::optional("location", "Lugar", Text),
        FieldSpec::optional("due_date", "Fecha", Date),
        FieldSpec::optional("priority", "Prioridad", Choice(PRIORITIES)),
        FieldSpec::optional("status", "Estado", Choice(STATUSES)),
        FieldSpec::optional("responsable", "Responsable", Text),
    ],
    defaults: AGENDA_DEFAULTS,
};

pub static COMMENT: FormSchema = FormSchema {
    name: "comment",
    fields: &[FieldSpec::required("content", "Nuevo Comentario", TextArea)],
    defaults: &[],
};

pub fn agenda_schema(kind: AgendaKind) -> &'static FormSchema {
    match kind {
        AgendaKind::Task => &TASK,
        AgendaKind::Hearing => &HEARING,
        AgendaKind::Term => &TERM,
        AgendaKind::Meeting => &MEETING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn trims_and_nulls_blank_optionals() {
        let out = CLIENT
            .validate(&row(json!({
                "name": "  Ana Gómez ",
                "email": "ana@bufete.co",
                "description": "   ",
                "owner_id": "ignored"
            })))
            .expect("valid client");
        assert_eq!(out["name"], "Ana Gómez");
        assert_eq!(out["description"], Value::Null);
        assert!(!out.contains_key("owner_id"));
    }

    #[test]
    fn missing_required_names_the_label() {
        let err = CLIENT
            .validate(&row(json!({"email": "ana@bufete.co"})))
            .expect_err("name missing");
        assert_eq!(err.code(), "FORM/REQUIRED");
        assert!(err.to_string().contains("Nombre"));
        let app: AppError = err.into();
        assert_eq!(app.context().get("field").map(String::as_str), Some("name"));
    }

    #[test]
    fn email_needs_text_on_both_sides() {
        for bad in ["ana", "@bufete.co", "ana@"] {
            let err = CLIENT
                .validate(&row(json!({"name": "Ana", "email": bad})))
                .expect_err(bad);
            assert_eq!(err.code(), "FORM/INVALID_EMAIL");
        }
    }

    #[test]
    fn dates_are_stored_in_iso_form() {
        let out = ACTION
            .validate(&row(json!({
                "action_date": "01/02/2024",
                "action": "Auto admite demanda",
                "term_end_date": "2024-02-10T00:00:00"
            })))
            .expect("valid action");
        assert_eq!(out["action_date"], "2024-02-01");
        assert_eq!(out["term_end_date"], "2024-02-10");
        assert_eq!(out["term_start_date"], Value::Null);

        let err = ACTION
            .validate(&row(json!({"action_date": "30/02/2024", "action": "x"})))
            .expect_err("impossible date");
        assert_eq!(err.code(), "FORM/INVALID_DATE");
    }

    #[test]
    fn term_days_must_be_an_integer() {
        let ok = TERM
            .validate(&row(json!({"name": "Contestar", "days_term": "10"})))
            .expect("valid term");
        assert_eq!(ok["days_term"], json!(10));
        let numeric = TERM
            .validate(&row(json!({"name": "Contestar", "days_term": 5})))
            .expect("numeric input");
        assert_eq!(numeric["days_term"], json!(5));
        let err = TERM
            .validate(&row(json!({"name": "Contestar", "days_term": "diez"})))
            .expect_err("not a number");
        assert_eq!(err.code(), "FORM/INVALID_NUMBER");
    }

    #[test]
    fn agenda_defaults_fill_priority_and_status() {
        let out = TASK
            .validate(&row(json!({"name": "Radicar memorial", "priority": ""})))
            .expect("valid task");
        assert_eq!(out["priority"], "medium");
        assert_eq!(out["status"], "pending");

        let err = TASK
            .validate(&row(json!({"name": "x", "priority": "urgent"})))
            .expect_err("bad choice");
        assert_eq!(err.code(), "FORM/INVALID_CHOICE");
    }

    #[test]
    fn patch_keeps_only_present_fields_without_defaults() {
        let out = TASK
            .validate_patch(&row(json!({"name": " Radicar poder ", "owner_id": "x"})))
            .expect("valid patch");
        assert_eq!(out.len(), 1);
        assert_eq!(out["name"], "Radicar poder");

        let cleared = TASK
            .validate_patch(&row(json!({"responsable": "", "due_date": "01/05/2024"})))
            .expect("valid patch");
        assert_eq!(cleared["responsable"], Value::Null);
        assert_eq!(cleared["due_date"], "2024-05-01");
        assert!(!cleared.contains_key("status"));

        let err = TASK
            .validate_patch(&row(json!({"name": "  "})))
            .expect_err("required field blanked");
        assert_eq!(err.code(), "FORM/REQUIRED");
        let err = TASK
            .validate_patch(&row(json!({"status": "done"})))
            .expect_err("bad choice");
        assert_eq!(err.code(), "FORM/INVALID_CHOICE");
    }

    #[test]
    fn subject_type_is_a_fixed_choice() {
        assert!(SUBJECT
            .validate(&row(json!({"type": "Demandado", "name": "Acme S.A."})))
            .is_ok());
        assert!(SUBJECT
            .validate(&row(json!({"type": "Testigo", "name": "Acme S.A."})))
            .is_err());
    }

    #[test]
    fn every_agenda_kind_has_a_schema_with_name() {
        for kind in AgendaKind::ALL {
            let schema = agenda_schema(kind);
            assert!(schema.field("name").map(|f| f.required).unwrap_or(false));
        }
        assert_eq!(agenda_schema(AgendaKind::Meeting).field("location").map(|f| f.label), Some("Lugar"));
    }
}
