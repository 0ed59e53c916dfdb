//! Utility functions shared by the parser, the aggregator and the CLI.
//!
//! - [`is_advertisement`]: Title heuristic for advertisement entries
//! - [`rebuild_link`]: Rebuild the resource path of a fulltext or PDF link
//! - [`normalize_spaces`]: Replace non-breaking spaces in metadata text
//! - [`find_duplicates`] / [`duplicate_indices`]: Exact duplicate detection
//! - [`timestamped_path`]: Timestamped save-file names for exports

mod dedup;
mod normalize;
mod savefile;

pub use dedup::{duplicate_indices, find_duplicates};
pub use normalize::{
    is_advertisement, normalize_spaces, or_placeholder, rebuild_link, NONE_PLACEHOLDER,
};
pub use savefile::{timestamped_path, TIMESTAMP_FORMAT};
