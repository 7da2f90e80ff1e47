use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::legal::ProcessSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Ordering weight, low = 1 through high = 3.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

/// The four per-process agenda screens share one record shape and differ
/// only in table names and a handful of extra columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgendaKind {
    Task,
    Hearing,
    Term,
    Meeting,
}

impl AgendaKind {
    pub const ALL: [AgendaKind; 4] = [
        AgendaKind::Task,
        AgendaKind::Hearing,
        AgendaKind::Term,
        AgendaKind::Meeting,
    ];

    pub fn table(self) -> &'static str {
        match self {
            AgendaKind::Task => "process_tasks",
            AgendaKind::Hearing => "process_hearings",
            AgendaKind::Term => "process_terms",
            AgendaKind::Meeting => "process_meetings",
        }
    }

    pub fn comment_table(self) -> &'static str {
        match self {
            AgendaKind::Task => "task_comments",
            AgendaKind::Hearing => "hearing_comments",
            AgendaKind::Term => "term_comments",
            AgendaKind::Meeting => "meeting_comments",
        }
    }

    /// Column of the comment table that points at the parent item.
    pub fn comment_parent_column(self) -> &'static str {
        match self {
            AgendaKind::Task => "task_id",
            AgendaKind::Hearing => "hearing_id",
            AgendaKind::Term => "term_id",
            AgendaKind::Meeting => "meeting_id",
        }
    }
}

impl FromStr for AgendaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" | "tasks" => Ok(AgendaKind::Task),
            "hearing" | "hearings" => Ok(AgendaKind::Hearing),
            "term" | "terms" => Ok(AgendaKind::Term),
            "meeting" | "meetings" => Ok(AgendaKind::Meeting),
            other => Err(format!("unknown agenda kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    /// Parent agenda item; stored under the kind-specific column.
    #[serde(alias = "task_id", alias = "hearing_id", alias = "term_id", alias = "meeting_id")]
    pub item_id: String,
    pub content: String,
    pub created_at: String,
}

/// Task, hearing, term or meeting attached to a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub id: String,
    pub process_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub responsable: Option<String>,
    pub created_at: String,
    /// Hearings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_status: Option<String>,
    /// Terms only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_term: Option<i64>,
    /// Terms only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_date: Option<String>,
    /// Meetings only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priority_ranks_follow_urgency() {
        assert!(Priority::Low.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::High.rank());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn status_parses_wire_names() {
        assert_eq!("in_progress".parse::<Status>(), Ok(Status::InProgress));
        assert!("done".parse::<Status>().is_err());
        assert_eq!(Status::Completed.to_string(), "completed");
    }

    #[test]
    fn term_row_deserializes_with_extra_columns() {
        let row = json!({
            "id": "t1",
            "process_id": "p1",
            "owner_id": "u1",
            "name": "Contestar demanda",
            "description": null,
            "days_term": 10,
            "notification_date": "2024-03-01",
            "due_date": "2024-03-15",
            "priority": "high",
            "status": "pending",
            "responsable": "Laura",
            "created_at": "2024-03-01T09:00:00.000Z"
        });
        let item: AgendaItem = serde_json::from_value(row).expect("term row");
        assert_eq!(item.days_term, Some(10));
        assert_eq!(item.priority, Priority::High);
        assert!(item.comments.is_empty());
        assert!(item.location.is_none());
    }

    #[test]
    fn comment_reads_kind_specific_parent_column() {
        let row = json!({
            "id": "c1",
            "hearing_id": "h1",
            "content": "Reprogramada",
            "created_at": "2024-03-01T09:00:00.000Z"
        });
        let comment: Comment = serde_json::from_value(row).expect("comment row");
        assert_eq!(comment.item_id, "h1");
    }
}
