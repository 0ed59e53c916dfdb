//! Core data models for extracted search results.

mod record;
mod table;

pub use record::{ResultRecord, COLUMNS, SEARCH_QUERY_COLUMN};
pub use table::{ExportError, ResultTable, Row, Value};
