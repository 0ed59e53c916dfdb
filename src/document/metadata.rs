//! Decomposition of the citation metadata attached to a result entry.
//!
//! Entries carry one or two `titleAuthorETC` spans: an optional author line and
//! a free-text citation loosely shaped like
//! `Publication (X); Y Vol. V, Iss. I,  (Date): Pages.`.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::utils::normalize_spaces;

/// Citation shape; groups 2 and 3 are matched but not kept.
const CITATION_PATTERN: &str = r"(.+) \((.+)\); (.+) Vol. (.+), Iss. (.+),\s+\((.+)\): (.+).";

fn citation_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(CITATION_PATTERN).expect("citation pattern is valid"))
}

/// Fields decoded from a citation string
///
/// All fields are absent when the string does not follow the citation shape,
/// which is expected for newspaper articles and advertisements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub publication: Option<String>,
    pub vol: Option<String>,
    pub issue: Option<String>,
    pub date: Option<String>,
    pub pages: Option<String>,
}

impl Citation {
    /// Decode a citation string
    pub fn parse(metadata: &str) -> Self {
        let Some(caps) = citation_regex().captures(metadata) else {
            tracing::debug!("Could not decode metadata: {}", metadata);
            return Self::default();
        };

        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Self {
            publication: group(1),
            vol: group(4),
            issue: group(5),
            date: group(6),
            pages: group(7),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Author and citation of one entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub author: Option<String>,
    pub citation: Citation,
}

impl EntryMetadata {
    /// Interpret the text of an entry's metadata spans
    ///
    /// One span is the citation alone; with two spans the first is the author
    /// line. Any other count is a malformed entry and yields no metadata at all.
    pub fn from_spans<S: AsRef<str>>(spans: &[S]) -> Self {
        match spans {
            [metadata] => Self {
                author: None,
                citation: Citation::parse(&normalize_spaces(metadata.as_ref())),
            },
            [author, metadata] => Self {
                author: Some(author.as_ref().trim().to_string()),
                citation: Citation::parse(&normalize_spaces(metadata.as_ref())),
            },
            _ => {
                tracing::warn!(
                    "Malformed entry: expected 1 or 2 metadata spans, found {}",
                    spans.len()
                );
                Self::default()
            }
        }
    }
}
