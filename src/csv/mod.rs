//! Line-oriented CSV handling for spreadsheets exchanged with the firm's
//! staff: a quote-aware field tokenizer, header normalization and a quoted
//! writer used by exports and templates.

mod headers;
mod serialize;
mod tokenizer;

pub use headers::{normalize_header, ColumnMap, ColumnResolution};
pub use serialize::{quote_field, write_quoted_row, write_table};
pub use tokenizer::{non_blank_lines, tokenize_line};
