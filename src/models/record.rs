//! Result record extracted from one entry of a search-result page.

use serde::{Deserialize, Serialize};

use super::table::Value;

/// Column names in output order
pub const COLUMNS: &[&str] = &[
    "author",
    "publication",
    "full_date",
    "vol",
    "issue",
    "title",
    "pages",
    "link_details",
    "link_pdf",
    "search_query",
    "ad",
];

/// Name of the column holding the originating query
pub const SEARCH_QUERY_COLUMN: &str = "search_query";

/// One literature search hit
///
/// `title` and both links always hold text: a missing value is stored as the
/// [`NONE_PLACEHOLDER`](crate::utils::NONE_PLACEHOLDER) literal. The other
/// optional fields stay absent (empty in CSV, `null` in JSON). Volume, issue, pages and date are kept as raw text since they may contain
/// ranges or non-numeric markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Author line, absent when the entry has no separate author span
    pub author: Option<String>,

    /// Publication (venue) name
    pub publication: Option<String>,

    /// Raw date text
    pub full_date: Option<String>,

    /// Volume
    pub vol: Option<String>,

    /// Issue
    pub issue: Option<String>,

    /// Title, or the placeholder literal
    pub title: String,

    /// Page range
    pub pages: Option<String>,

    /// Fulltext resource path, or the placeholder literal
    pub link_details: String,

    /// PDF resource path, or the placeholder literal
    pub link_pdf: String,

    /// Query of the originating document, only set on aggregated records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    /// Advertisement guess, see [`is_advertisement`](crate::utils::is_advertisement)
    pub ad: bool,
}

impl ResultRecord {
    /// Value of a column by name
    pub fn value(&self, column: &str) -> Option<Value> {
        let value = match column {
            "author" => Value::from(self.author.clone()),
            "publication" => Value::from(self.publication.clone()),
            "full_date" => Value::from(self.full_date.clone()),
            "vol" => Value::from(self.vol.clone()),
            "issue" => Value::from(self.issue.clone()),
            "title" => Value::Text(self.title.clone()),
            "pages" => Value::from(self.pages.clone()),
            "link_details" => Value::Text(self.link_details.clone()),
            "link_pdf" => Value::Text(self.link_pdf.clone()),
            "search_query" => Value::from(self.search_query.clone()),
            "ad" => Value::Bool(self.ad),
            _ => return None,
        };
        Some(value)
    }
}
