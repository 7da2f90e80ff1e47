use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::form::{self, FormSchema};
use crate::id::new_uuid_v7;
use crate::listing::{text_search, Listing};
use crate::model::{
    action, legal, AgendaItem, AgendaKind, Client, ClientSummary, Comment, Process,
    ProcessAction, ProcessSubject, ProcessSummary, Status,
};
use crate::session::{Identity, Session};
use crate::store::{DataStore, Query, Row, SortDirection, StoreError, OWNER_COLUMN};
use crate::time::now_rfc3339;
use crate::{AppError, AppResult};

/// Typed access to the domain tables on behalf of one session.
///
/// Every call resolves the session identity first, so an unauthenticated
/// session fails with `AUTH/REQUIRED` before any store round trip.
pub struct Repository<'a, S: DataStore + ?Sized> {
    store: &'a S,
    session: &'a Session,
}

impl<'a, S: DataStore + ?Sized> Repository<'a, S> {
    pub fn new(store: &'a S, session: &'a Session) -> Self {
        Self { store, session }
    }

    fn identity(&self) -> AppResult<&'a Identity> {
        Ok(self.session.identity()?)
    }

    async fn select(&self, table: &str, query: Query) -> AppResult<Vec<Row>> {
        let identity = self.identity()?;
        self.store
            .select(identity, table, &query)
            .await
            .map_err(|err| context(err, "select", table))
    }

    async fn select_as<T: DeserializeOwned>(&self, table: &str, query: Query) -> AppResult<Vec<T>> {
        self.select(table, query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn get_as<T: DeserializeOwned>(&self, table: &str, id: &str) -> AppResult<T> {
        let row = self
            .select(table, Query::new().eq("id", id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                context(
                    StoreError::NotFound {
                        table: table.to_string(),
                        id: id.to_string(),
                    },
                    "get",
                    table,
                )
            })?;
        decode(row)
    }

    /// Validates `input`, stamps id, owner and creation time, adds the
    /// parent `links`, and inserts the single row.
    async fn create(
        &self,
        table: &str,
        schema: &FormSchema,
        input: &Row,
        links: &[(&str, &str)],
    ) -> AppResult<Row> {
        let identity = self.identity()?;
        let mut row = schema.validate(input)?;
        row.insert("id".into(), Value::String(new_uuid_v7()));
        row.insert(OWNER_COLUMN.into(), Value::String(identity.user_id.clone()));
        row.insert("created_at".into(), Value::String(now_rfc3339()));
        for (key, value) in links {
            row.insert((*key).to_string(), Value::String((*value).to_string()));
        }
        let mut inserted = self
            .store
            .insert(identity, table, vec![row])
            .await
            .map_err(|err| context(err, "create", table))?;
        tracing::info!(target: "lexdesk", event = "record_created", table, schema = schema.name);
        inserted
            .pop()
            .ok_or_else(|| AppError::new("STORE/EMPTY_RESULT", "Insert returned no rows"))
    }

    async fn patch(&self, table: &str, id: &str, patch: Row) -> AppResult<()> {
        let identity = self.identity()?;
        self.store
            .update(identity, table, id, patch)
            .await
            .map_err(|err| context(err, "update", table).with_context("id", id))
    }

    /// Validates the fields present in `input` and writes only those.
    async fn edit(&self, table: &str, schema: &FormSchema, id: &str, input: &Row) -> AppResult<()> {
        let patch = schema.validate_patch(input)?;
        self.patch(table, id, patch).await
    }

    async fn remove(&self, table: &str, id: &str) -> AppResult<()> {
        let identity = self.identity()?;
        self.store
            .delete(identity, table, id)
            .await
            .map_err(|err| context(err, "delete", table).with_context("id", id))
    }

    // Clients

    /// Newest first.
    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        self.select_as(
            legal::CLIENTS_TABLE,
            Query::new().order("created_at", SortDirection::Desc),
        )
        .await
    }

    /// Alphabetical, for the client picker in the process form.
    pub async fn client_choices(&self) -> AppResult<Vec<Client>> {
        self.select_as(
            legal::CLIENTS_TABLE,
            Query::new().order("name", SortDirection::Asc),
        )
        .await
    }

    pub async fn get_client(&self, id: &str) -> AppResult<Client> {
        self.get_as(legal::CLIENTS_TABLE, id).await
    }

    pub async fn create_client(&self, input: &Row) -> AppResult<Client> {
        let row = self.create(legal::CLIENTS_TABLE, &form::CLIENT, input, &[]).await?;
        decode(row)
    }

    pub async fn update_client(&self, id: &str, input: &Row) -> AppResult<()> {
        self.edit(legal::CLIENTS_TABLE, &form::CLIENT, id, input).await
    }

    pub async fn delete_client(&self, id: &str) -> AppResult<()> {
        self.remove(legal::CLIENTS_TABLE, id).await
    }

    // Processes

    async fn with_clients(&self, mut processes: Vec<Process>) -> AppResult<Vec<Process>> {
        let clients: HashMap<String, ClientSummary> = self
            .list_clients()
            .await?
            .iter()
            .map(|c| (c.id.clone(), ClientSummary::from(c)))
            .collect();
        for process in &mut processes {
            process.client = clients.get(&process.client_id).cloned();
        }
        Ok(processes)
    }

    /// Newest first, each with its client's name and email attached.
    pub async fn list_processes(&self) -> AppResult<Vec<Process>> {
        let processes = self
            .select_as(
                legal::PROCESSES_TABLE,
                Query::new().order("created_at", SortDirection::Desc),
            )
            .await?;
        self.with_clients(processes).await
    }

    pub async fn list_processes_for_client(&self, client_id: &str) -> AppResult<Vec<Process>> {
        let processes = self
            .select_as(
                legal::PROCESSES_TABLE,
                Query::new()
                    .eq("client_id", client_id)
                    .order("created_at", SortDirection::Desc),
            )
            .await?;
        self.with_clients(processes).await
    }

    /// Case-insensitive match on client name or filing number.
    pub async fn search_processes(&self, query: &str) -> AppResult<Vec<Process>> {
        let processes = self.list_processes().await?;
        let search = text_search(query, |p: &Process| {
            vec![
                p.client.as_ref().map(|c| c.name.as_str()),
                p.filing_number.as_deref(),
            ]
        });
        Ok(Listing::new(processes.len()).filter(search).collect(&processes))
    }

    pub async fn get_process(&self, id: &str) -> AppResult<Process> {
        let process: Process = self.get_as(legal::PROCESSES_TABLE, id).await?;
        let mut joined = self.with_clients(vec![process]).await?;
        joined
            .pop()
            .ok_or_else(|| AppError::new("STORE/EMPTY_RESULT", "Process lookup returned no rows"))
    }

    pub async fn create_process(&self, input: &Row) -> AppResult<Process> {
        let row = self
            .create(legal::PROCESSES_TABLE, &form::PROCESS, input, &[])
            .await?;
        decode(row)
    }

    pub async fn update_process(&self, id: &str, input: &Row) -> AppResult<()> {
        self.edit(legal::PROCESSES_TABLE, &form::PROCESS, id, input).await
    }

    pub async fn delete_process(&self, id: &str) -> AppResult<()> {
        self.remove(legal::PROCESSES_TABLE, id).await
    }

    // Subjects

    pub async fn list_subjects(&self, process_id: &str) -> AppResult<Vec<ProcessSubject>> {
        self.select_as(
            legal::SUBJECTS_TABLE,
            Query::new()
                .eq("process_id", process_id)
                .order("created_at", SortDirection::Desc),
        )
        .await
    }

    pub async fn create_subject(&self, process_id: &str, input: &Row) -> AppResult<ProcessSubject> {
        let row = self
            .create(
                legal::SUBJECTS_TABLE,
                &form::SUBJECT,
                input,
                &[("process_id", process_id)],
            )
            .await?;
        decode(row)
    }

    pub async fn update_subject(&self, id: &str, input: &Row) -> AppResult<()> {
        self.edit(legal::SUBJECTS_TABLE, &form::SUBJECT, id, input).await
    }

    pub async fn delete_subject(&self, id: &str) -> AppResult<()> {
        self.remove(legal::SUBJECTS_TABLE, id).await
    }

    // Actions

    pub async fn list_actions(
        &self,
        process_id: &str,
        direction: SortDirection,
    ) -> AppResult<Vec<ProcessAction>> {
        self.select_as(
            action::TABLE,
            Query::new()
                .eq("process_id", process_id)
                .order("action_date", direction),
        )
        .await
    }

    pub async fn create_action(&self, process_id: &str, input: &Row) -> AppResult<ProcessAction> {
        let row = self
            .create(action::TABLE, &form::ACTION, input, &[("process_id", process_id)])
            .await?;
        decode(row)
    }

    pub async fn update_action(&self, id: &str, input: &Row) -> AppResult<()> {
        self.edit(action::TABLE, &form::ACTION, id, input).await
    }

    pub async fn delete_action(&self, id: &str) -> AppResult<()> {
        self.remove(action::TABLE, id).await
    }

    // Agenda

    async fn comments_for(&self, kind: AgendaKind, item_id: &str) -> AppResult<Vec<Comment>> {
        self.select_as(
            kind.comment_table(),
            Query::new()
                .eq(kind.comment_parent_column(), item_id)
                .order("created_at", SortDirection::Asc),
        )
        .await
    }

    /// Newest first, each with its comment thread oldest first.
    pub async fn list_agenda(&self, kind: AgendaKind, process_id: &str) -> AppResult<Vec<AgendaItem>> {
        let mut items: Vec<AgendaItem> = self
            .select_as(
                kind.table(),
                Query::new()
                    .eq("process_id", process_id)
                    .order("created_at", SortDirection::Desc),
            )
            .await?;
        for item in &mut items {
            item.comments = self.comments_for(kind, &item.id).await?;
        }
        Ok(items)
    }

    pub async fn create_agenda(
        &self,
        kind: AgendaKind,
        process_id: &str,
        input: &Row,
    ) -> AppResult<AgendaItem> {
        let row = self
            .create(
                kind.table(),
                form::agenda_schema(kind),
                input,
                &[("process_id", process_id)],
            )
            .await?;
        decode(row)
    }

    pub async fn update_agenda(&self, kind: AgendaKind, id: &str, input: &Row) -> AppResult<()> {
        self.edit(kind.table(), form::agenda_schema(kind), id, input).await
    }

    /// Moves an item to another kanban column.
    pub async fn set_status(&self, kind: AgendaKind, id: &str, status: Status) -> AppResult<()> {
        let mut patch = Row::new();
        patch.insert("status".into(), Value::String(status.as_str().to_string()));
        self.patch(kind.table(), id, patch).await
    }

    /// Deletes the item together with its comment thread.
    pub async fn delete_agenda(&self, kind: AgendaKind, id: &str) -> AppResult<()> {
        for comment in self.comments_for(kind, id).await? {
            self.remove(kind.comment_table(), &comment.id).await?;
        }
        self.remove(kind.table(), id).await
    }

    pub async fn add_comment(&self, kind: AgendaKind, item_id: &str, input: &Row) -> AppResult<Comment> {
        // Resolves the parent first so comments never reference another owner's item.
        let _: AgendaItem = self.get_as(kind.table(), item_id).await?;
        let row = self
            .create(
                kind.comment_table(),
                &form::COMMENT,
                input,
                &[(kind.comment_parent_column(), item_id)],
            )
            .await?;
        decode(row)
    }

    /// Agenda items of every process, newest first, each with its process
    /// and client attached. Items whose process is gone are still listed.
    pub async fn list_formats(&self, kind: AgendaKind) -> AppResult<Vec<AgendaItem>> {
        let processes: HashMap<String, ProcessSummary> = self
            .list_processes()
            .await?
            .into_iter()
            .filter_map(|p| {
                let client = p.client?;
                Some((
                    p.id.clone(),
                    ProcessSummary {
                        id: p.id,
                        filing_number: p.filing_number,
                        court: p.court,
                        client,
                    },
                ))
            })
            .collect();
        let mut items: Vec<AgendaItem> = self
            .select_as(
                kind.table(),
                Query::new().order("created_at", SortDirection::Desc),
            )
            .await?;
        for item in &mut items {
            item.process = processes.get(&item.process_id).cloned();
        }
        Ok(items)
    }
}

fn decode<T: DeserializeOwned>(row: Row) -> AppResult<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

fn context(err: StoreError, operation: &str, table: &str) -> AppError {
    AppError::from(err)
        .with_context("operation", operation)
        .with_context("table", table)
}
