//! # ProQuest Results
//!
//! Extracts bibliographic records from saved ProQuest search-result pages and
//! aggregates them across many pages into one table.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`document`]: Parser for one saved result page ([`ProQuestDocument`])
//! - [`aggregate`]: Batch loading of many pages with query indexes ([`ResultSet`])
//! - [`models`]: Result records and the tabular view with CSV export
//! - [`utils`]: Advertisement heuristic, link rebuilding, deduplication, file naming
//! - [`config`]: Configuration management

pub mod aggregate;
pub mod config;
pub mod document;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use aggregate::{InputSource, QueryIndex, ResultSet};
pub use document::ProQuestDocument;
pub use models::{ResultRecord, ResultTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
