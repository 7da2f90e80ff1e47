//! Record shapes stored by the dashboard. Field names match the columns of
//! the data store so rows deserialize directly.

pub mod action;
pub mod agenda;
pub mod legal;

pub use action::{NewProcessAction, ProcessAction};
pub use agenda::{AgendaItem, AgendaKind, Comment, Priority, Status};
pub use legal::{Client, ClientSummary, Process, ProcessSubject, ProcessSummary};
