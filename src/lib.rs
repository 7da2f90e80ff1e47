pub mod config;
pub mod csv;
pub mod db;
mod error;
pub mod export;
pub mod form;
pub mod id;
pub mod import;
pub mod listing;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod repo;
pub mod session;
pub mod store;
pub mod time;

pub use error::{AppError, AppResult};
pub use session::{Identity, Session};
