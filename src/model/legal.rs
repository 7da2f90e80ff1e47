use serde::{Deserialize, Serialize};

pub const CLIENTS_TABLE: &str = "clients";
pub const PROCESSES_TABLE: &str = "processes";
pub const SUBJECTS_TABLE: &str = "process_subjects";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Client> for ClientSummary {
    fn from(client: &Client) -> Self {
        ClientSummary {
            name: client.name.clone(),
            email: Some(client.email.clone()),
        }
    }
}

/// A legal case ("proceso") with its court and classification metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub filing_number: Option<String>,
    pub filing_date: String,
    pub court: String,
    pub judge: String,
    pub process_type: String,
    pub process_class: String,
    pub process_subclass: String,
    #[serde(default)]
    pub documents_url: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub file_location: Option<String>,
    #[serde(default)]
    pub filing_content: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientSummary>,
}

/// The slice of a process shown next to agenda items in the formats view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub id: String,
    #[serde(default)]
    pub filing_number: Option<String>,
    pub court: String,
    pub client: ClientSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSubject {
    pub id: String,
    pub process_id: String,
    /// Procedural role, e.g. "demandante" or "demandado".
    #[serde(rename = "type")]
    pub subject_type: String,
    pub name: String,
    pub created_at: String,
}
