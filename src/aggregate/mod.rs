//! Aggregation of many result pages into one record sequence.
//!
//! A [`ResultSet`] resolves its [`InputSource`] to a list of documents when it
//! is created. Records, the table view and the query indexes are computed on
//! first access and cached; later accesses never parse a document again.
//!
//! ```rust,no_run
//! use proquest_results::aggregate::{InputSource, ResultSet};
//! use proquest_results::config::ParseOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let set = ResultSet::new(InputSource::directory("search_results"), ParseOptions::default())?;
//! println!("{} records from {} files", set.len()?, set.files().len());
//! for (query, files) in set.query_to_files()?.iter() {
//!     println!("{query}: {} files", files.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ParseOptions::keep_raw`] only applies to a standalone
//! [`ProQuestDocument`]; documents opened by a result set never keep their raw text.

mod index;
mod input;

pub use index::QueryIndex;
pub use input::{resolve_inputs, InputSource};

use once_cell::unsync::OnceCell;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::ParseOptions;
use crate::document::{DocumentError, ProQuestDocument};
use crate::models::{ResultRecord, ResultTable};

/// Errors that can occur when aggregating documents
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// A directory could not be scanned
    #[error("Cannot read directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A document could not be opened
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// What was read from one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub query: String,
    pub results: usize,
}

#[derive(Debug)]
struct Loaded {
    documents: Vec<DocumentSummary>,
    results: Vec<ResultRecord>,
}

/// Records of many result pages, with query indexes
#[derive(Debug)]
pub struct ResultSet {
    files: Vec<PathBuf>,
    options: ParseOptions,
    loaded: OnceCell<Loaded>,
    table: OnceCell<Option<ResultTable>>,
    query_to_files: OnceCell<QueryIndex>,
    files_to_query: OnceCell<HashMap<PathBuf, String>>,
}

impl ResultSet {
    /// Create a result set from an input source
    ///
    /// Directories are scanned immediately; documents are opened lazily.
    pub fn new(source: InputSource, options: ParseOptions) -> Result<Self, AggregateError> {
        let files = resolve_inputs(&source, &options)?;
        Ok(Self::from_files(files, options))
    }

    /// Create a result set over an already resolved list of documents
    pub fn from_files(files: Vec<PathBuf>, options: ParseOptions) -> Self {
        Self {
            files,
            options,
            loaded: OnceCell::new(),
            table: OnceCell::new(),
            query_to_files: OnceCell::new(),
            files_to_query: OnceCell::new(),
        }
    }

    /// Document paths in processing order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Total number of records across all documents
    pub fn len(&self) -> Result<usize, AggregateError> {
        Ok(self.results()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, AggregateError> {
        Ok(self.results()?.is_empty())
    }

    /// All records, in document order then entry order
    ///
    /// Each record carries the query of the document it came from.
    pub fn results(&self) -> Result<&[ResultRecord], AggregateError> {
        Ok(&self.load()?.results)
    }

    /// Per-document summaries, in document order
    pub fn documents(&self) -> Result<&[DocumentSummary], AggregateError> {
        Ok(&self.load()?.documents)
    }

    /// Tabular view over all records, `None` when there are no records
    pub fn table(&self) -> Result<Option<&ResultTable>, AggregateError> {
        let table = self
            .table
            .get_or_try_init(|| -> Result<_, AggregateError> {
                let results = self.results()?;
                Ok((!results.is_empty()).then(|| ResultTable::from_records(results)))
            })?;
        Ok(table.as_ref())
    }

    /// Documents grouped by the query that produced them
    ///
    /// Queries follow the order in which they first appear in [`files`](Self::files).
    pub fn query_to_files(&self) -> Result<&QueryIndex, AggregateError> {
        self.query_to_files.get_or_try_init(|| -> Result<_, AggregateError> {
            Ok(self
                .queries()?
                .into_iter()
                .map(|(path, query)| (query, path))
                .collect())
        })
    }

    /// The query of each document; the first occurrence wins for repeated paths
    pub fn files_to_query(&self) -> Result<&HashMap<PathBuf, String>, AggregateError> {
        self.files_to_query.get_or_try_init(|| -> Result<_, AggregateError> {
            let mut index: HashMap<PathBuf, String> = HashMap::new();
            for (path, query) in self.queries()? {
                index.entry(path).or_insert(query);
            }
            Ok(index)
        })
    }

    fn load(&self) -> Result<&Loaded, AggregateError> {
        self.loaded.get_or_try_init(|| -> Result<_, AggregateError> {
            let options = self.document_options();
            let parsed = self.map_documents(|path| load_document(path, &options))?;

            let total = parsed.len();
            let mut documents = Vec::with_capacity(total);
            let mut results = Vec::new();
            for (i, (summary, records)) in parsed.into_iter().enumerate() {
                tracing::info!(
                    "Processing file {} of {}. Search query is '{}'. Results so far: {}",
                    i + 1,
                    total,
                    summary.query,
                    results.len()
                );
                results.extend(records);
                documents.push(summary);
            }

            tracing::info!("Total results: {}", results.len());
            Ok(Loaded { documents, results })
        })
    }

    /// Query of every document, reusing loaded documents when available
    fn queries(&self) -> Result<Vec<(PathBuf, String)>, AggregateError> {
        if let Some(loaded) = self.loaded.get() {
            return Ok(loaded
                .documents
                .iter()
                .map(|d| (d.path.clone(), d.query.clone()))
                .collect());
        }

        let options = self.document_options();
        let queries = self.map_documents(|path| {
            let document = ProQuestDocument::open_with(path, &options)?;
            Ok((path.to_path_buf(), document.query().to_string()))
        })?;
        Ok(queries)
    }

    /// Options for the documents this set opens; their raw text is dropped
    fn document_options(&self) -> ParseOptions {
        self.options.clone().keep_raw(false)
    }

    /// Apply `f` to every document path, in parallel when configured
    ///
    /// Output order always follows [`files`](Self::files).
    fn map_documents<T, F>(&self, f: F) -> Result<Vec<T>, DocumentError>
    where
        T: Send,
        F: Fn(&Path) -> Result<T, DocumentError> + Send + Sync,
    {
        if self.options.parallel {
            self.files.par_iter().map(|path| f(path.as_path())).collect()
        } else {
            self.files.iter().map(|path| f(path.as_path())).collect()
        }
    }
}

fn load_document(
    path: &Path,
    options: &ParseOptions,
) -> Result<(DocumentSummary, Vec<ResultRecord>), DocumentError> {
    let document = ProQuestDocument::open_with(path, options)?;
    let query = document.query().to_string();

    let mut records = document.into_results();
    for record in &mut records {
        record.search_query = Some(query.clone());
    }

    let summary = DocumentSummary {
        path: path.to_path_buf(),
        query,
        results: records.len(),
    };
    Ok((summary, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn page(query: &str, titles: &[&str]) -> String {
        let entries: String = titles
            .iter()
            .map(|t| {
                format!(
                    "<li class=\"resultItem\"><a class=\"previewTitle\" href=\"#\">{}</a>\
                     <span class=\"titleAuthorETC\">X (Y); Z Vol. 1, Iss. 2,  (D): 3.</span></li>",
                    t
                )
            })
            .collect();
        format!(
            "<html><body><textarea id=\"searchTerm\">{}</textarea><ul>{}</ul></body></html>",
            query, entries
        )
    }

    fn write_pages(pages: &[(&str, &str, Vec<&str>)]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempdir().unwrap();
        let paths = pages
            .iter()
            .map(|(name, query, titles)| {
                let path = dir.path().join(name);
                fs::write(&path, page(query, titles)).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    #[test]
    fn test_empty_set() {
        let set = ResultSet::from_files(Vec::new(), ParseOptions::default());
        assert_eq!(set.len().unwrap(), 0);
        assert!(set.is_empty().unwrap());
        assert!(set.results().unwrap().is_empty());
        assert!(set.table().unwrap().is_none());
        assert!(set.query_to_files().unwrap().is_empty());
        assert!(set.files_to_query().unwrap().is_empty());
    }

    #[test]
    fn test_concatenation_order() {
        let (_dir, files) = write_pages(&[
            ("b.html", "dogs", vec!["Dog 1", "Dog 2"]),
            ("a.html", "cats", vec!["Cat 1"]),
        ]);
        let set = ResultSet::from_files(files, ParseOptions::default());

        let titles: Vec<&str> = set
            .results()
            .unwrap()
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Dog 1", "Dog 2", "Cat 1"]);

        let queries: Vec<Option<&str>> = set
            .results()
            .unwrap()
            .iter()
            .map(|r| r.search_query.as_deref())
            .collect();
        assert_eq!(queries, vec![Some("dogs"), Some("dogs"), Some("cats")]);
        assert_eq!(set.len().unwrap(), 3);

        let summaries = set.documents().unwrap();
        assert_eq!(summaries[0].results, 2);
        assert_eq!(summaries[1].query, "cats");
    }

    #[test]
    fn test_results_are_cached() {
        let (_dir, files) = write_pages(&[("a.html", "cats", vec!["Cat 1"])]);
        let set = ResultSet::from_files(files.clone(), ParseOptions::default());

        let first = set.results().unwrap().as_ptr();
        fs::remove_file(&files[0]).unwrap();
        let second = set.results().unwrap().as_ptr();
        assert_eq!(first, second);
        assert_eq!(set.table().unwrap().map(|t| t.len()), Some(1));
    }

    #[test]
    fn test_shared_query_index() {
        let (_dir, files) = write_pages(&[
            ("one.html", "cats", vec!["Cat 1"]),
            ("two.html", "dogs", vec!["Dog 1"]),
            ("three.html", "cats", vec!["Cat 2"]),
        ]);
        let set = ResultSet::from_files(files.clone(), ParseOptions::default());

        let index = set.query_to_files().unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index["cats"], vec![files[0].clone(), files[2].clone()]);
        assert_eq!(index["dogs"], vec![files[1].clone()]);

        let inverse = set.files_to_query().unwrap();
        assert_eq!(inverse[&files[1]], "dogs");
        assert_eq!(inverse.len(), 3);
    }

    #[test]
    fn test_query_index_follows_document_order() {
        let queries = ["zebra", "apple", "mango", "kiwi", "banana", "cherry", "date", "fig"];
        let names: Vec<String> = (0..queries.len()).map(|i| format!("{:02}.html", i)).collect();
        let pages: Vec<(&str, &str, Vec<&str>)> = names
            .iter()
            .zip(queries)
            .map(|(name, query)| (name.as_str(), query, vec!["Entry"]))
            .collect();
        let (_dir, files) = write_pages(&pages);

        let cold = ResultSet::from_files(files.clone(), ParseOptions::default());
        let keys: Vec<&str> = cold.query_to_files().unwrap().queries().collect();
        assert_eq!(keys, queries);

        let warm = ResultSet::from_files(files, ParseOptions::default().parallel(true));
        warm.results().unwrap();
        let keys: Vec<&str> = warm.query_to_files().unwrap().queries().collect();
        assert_eq!(keys, queries);
    }

    #[test]
    fn test_documents_never_keep_raw_text() {
        let set = ResultSet::from_files(Vec::new(), ParseOptions::default().keep_raw(true));
        assert!(set.options().keep_raw);
        assert!(!set.document_options().keep_raw);
    }

    #[test]
    fn test_index_before_and_after_load_match() {
        let (_dir, files) = write_pages(&[
            ("one.html", "cats", vec!["Cat 1"]),
            ("two.html", "cats", vec![]),
        ]);

        let cold = ResultSet::from_files(files.clone(), ParseOptions::default());
        let cold_index = cold.query_to_files().unwrap().clone();

        let warm = ResultSet::from_files(files, ParseOptions::default());
        warm.results().unwrap();
        assert_eq!(warm.query_to_files().unwrap(), &cold_index);
    }

    #[test]
    fn test_repeated_file_first_wins() {
        let (_dir, files) = write_pages(&[("one.html", "cats", vec!["Cat 1"])]);
        let repeated = vec![files[0].clone(), files[0].clone()];
        let set = ResultSet::from_files(repeated, ParseOptions::default());

        assert_eq!(set.files_to_query().unwrap().len(), 1);
        assert_eq!(set.query_to_files().unwrap()["cats"].len(), 2);
        assert_eq!(set.len().unwrap(), 2);
    }

    #[test]
    fn test_missing_document_fails() {
        let set = ResultSet::from_files(
            vec![PathBuf::from("/nonexistent/page.html")],
            ParseOptions::default(),
        );
        assert!(matches!(
            set.results(),
            Err(AggregateError::Document(DocumentError::NotAFile(_)))
        ));
        assert!(set.query_to_files().is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (_dir, files) = write_pages(&[
            ("a.html", "cats", vec!["Cat 1", "Cat 2"]),
            ("b.html", "dogs", vec!["Dog 1"]),
            ("c.html", "birds", vec!["Bird 1", "Bird 2", "Bird 3"]),
        ]);

        let sequential = ResultSet::from_files(files.clone(), ParseOptions::default());
        let parallel = ResultSet::from_files(files, ParseOptions::default().parallel(true));
        assert_eq!(sequential.results().unwrap(), parallel.results().unwrap());
    }

    #[test]
    fn test_new_scans_directory() {
        let (dir, _files) = write_pages(&[
            ("a.html", "cats", vec!["Cat 1"]),
            ("b.html", "dogs", vec!["Dog 1"]),
        ]);
        fs::write(dir.path().join(".DS_Store"), "not html").unwrap();

        let set = ResultSet::new(InputSource::directory(dir.path()), ParseOptions::default())
            .unwrap();
        assert_eq!(set.files().len(), 2);
        assert_eq!(set.len().unwrap(), 2);
    }
}
