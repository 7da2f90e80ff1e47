use serde::{Deserialize, Serialize};

pub const TABLE: &str = "process_actions";

/// A dated procedural filing ("actuación") as submitted for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProcessAction {
    pub process_id: String,
    pub owner_id: String,
    /// `YYYY-MM-DD`.
    pub action_date: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_end_date: Option<String>,
}

impl NewProcessAction {
    /// Sets an optional column by its canonical key. Unknown keys and the
    /// mandatory columns are ignored.
    pub fn set_optional(&mut self, key: &str, value: String) {
        match key {
            "annotation" => self.annotation = Some(value),
            "term_start_date" => self.term_start_date = Some(value),
            "term_end_date" => self.term_end_date = Some(value),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessAction {
    pub id: String,
    pub process_id: String,
    pub owner_id: String,
    pub action_date: String,
    pub action: String,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub term_start_date: Option<String>,
    #[serde(default)]
    pub term_end_date: Option<String>,
    pub created_at: String,
}
