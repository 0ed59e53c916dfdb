//! Query to document index that keeps document order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::ops::Index;
use std::path::PathBuf;

/// Documents grouped by query
///
/// Queries are kept in the order they first appear, and documents in the
/// order they were added. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryIndex {
    entries: Vec<(String, Vec<PathBuf>)>,
    positions: HashMap<String, usize>,
}

impl QueryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under its query
    pub fn insert(&mut self, query: String, path: PathBuf) {
        match self.positions.get(&query) {
            Some(&position) => self.entries[position].1.push(path),
            None => {
                self.positions.insert(query.clone(), self.entries.len());
                self.entries.push((query, vec![path]));
            }
        }
    }

    /// Documents produced by `query`
    pub fn get(&self, query: &str) -> Option<&[PathBuf]> {
        self.positions
            .get(query)
            .map(|&position| self.entries[position].1.as_slice())
    }

    pub fn contains(&self, query: &str) -> bool {
        self.positions.contains_key(query)
    }

    /// Queries in first-appearance order
    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(query, _)| query.as_str())
    }

    /// Queries with their documents, in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(query, files)| (query.as_str(), files.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, PathBuf)> for QueryIndex {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        let mut index = QueryIndex::new();
        for (query, path) in iter {
            index.insert(query, path);
        }
        index
    }
}

impl Index<&str> for QueryIndex {
    type Output = [PathBuf];

    /// Panics when no document has `query`, like `HashMap` indexing
    fn index(&self, query: &str) -> &[PathBuf] {
        match self.get(query) {
            Some(files) => files,
            None => panic!("no documents for query '{}'", query),
        }
    }
}

impl Serialize for QueryIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (query, files) in &self.entries {
            map.serialize_entry(query, files)?;
        }
        map.end()
    }
}
