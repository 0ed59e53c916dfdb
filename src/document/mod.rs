//! Parser for one saved ProQuest search-result page.
//!
//! A [`ProQuestDocument`] reads and parses its file once when it is opened and
//! extracts the search query right away. Result records are extracted on first
//! access and cached for the lifetime of the document.
//!
//! ```rust,no_run
//! use proquest_results::document::ProQuestDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = ProQuestDocument::open("search_results/cats.html")?;
//! println!("{} results for '{}'", document.len(), document.query());
//! for record in document.results() {
//!     println!("{} ({:?})", record.title, record.publication);
//! }
//! # Ok(())
//! # }
//! ```

pub mod metadata;

use scraper::{ElementRef, Html, Selector};
use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::ParseOptions;
use crate::models::{ResultRecord, ResultTable};
use crate::utils::{is_advertisement, or_placeholder, rebuild_link};
use metadata::EntryMetadata;

pub use metadata::Citation;

/// CSS selectors for the parts of a result page
struct Selectors {
    query: Selector,
    entry: Selector,
    title: Selector,
    fulltext: Selector,
    pdf: Selector,
    metadata: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        query: parse_selector("textarea#searchTerm"),
        entry: parse_selector("li.resultItem"),
        title: parse_selector("a.previewTitle"),
        fulltext: parse_selector("a.format_fulltext"),
        pdf: parse_selector("a.format_pdf"),
        metadata: parse_selector("span.titleAuthorETC"),
    })
}

fn parse_selector(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector is valid")
}

/// Errors that can occur when opening a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The path does not reference a file
    #[error("{} needs to be a readable file", .0.display())]
    NotAFile(PathBuf),

    /// The file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The page has no search query control, so it is not a result page
    #[error("No search query found in {}", .0.display())]
    MissingQuery(PathBuf),
}

/// One saved search-result page
pub struct ProQuestDocument {
    path: PathBuf,
    query: String,
    html: Html,
    entry_count: usize,
    raw: Option<String>,
    results: OnceCell<Vec<ResultRecord>>,
    table: OnceCell<ResultTable>,
}

impl ProQuestDocument {
    /// Open a document with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        Self::open_with(path, &ParseOptions::default())
    }

    /// Open a document
    ///
    /// Fails when the path is not a readable file or the page has no search query.
    pub fn open_with(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DocumentError::NotAFile(path.to_path_buf()));
        }

        let source = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_source(path, source, options)
    }

    /// Parse a document from text already in memory
    ///
    /// `path` only identifies the document.
    pub fn from_source(
        path: impl Into<PathBuf>,
        source: String,
        options: &ParseOptions,
    ) -> Result<Self, DocumentError> {
        let path = path.into();
        let html = Html::parse_document(&source);
        let selectors = selectors();

        let query = html
            .select(&selectors.query)
            .next()
            .map(|element| element_text(&element).trim_start().to_string())
            .ok_or_else(|| DocumentError::MissingQuery(path.clone()))?;

        let entry_count = html.select(&selectors.entry).count();
        tracing::debug!(
            "Parsed {} with {} entries for query '{}'",
            path.display(),
            entry_count,
            query
        );

        Ok(Self {
            path,
            query,
            html,
            entry_count,
            raw: options.keep_raw.then_some(source),
            results: OnceCell::new(),
            table: OnceCell::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The search query that produced this page
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Raw page text, when kept via [`ParseOptions::keep_raw`]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Number of result entries on the page
    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Result records in page order, extracted on first access
    pub fn results(&self) -> &[ResultRecord] {
        self.results.get_or_init(|| extract_results(&self.html))
    }

    /// Tabular view over [`results`](Self::results)
    pub fn table(&self) -> &ResultTable {
        self.table
            .get_or_init(|| ResultTable::from_records(self.results()))
    }

    /// Consume the document, returning its records
    pub fn into_results(self) -> Vec<ResultRecord> {
        let html = self.html;
        self.results
            .into_inner()
            .unwrap_or_else(|| extract_results(&html))
    }
}

impl fmt::Debug for ProQuestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProQuestDocument")
            .field("path", &self.path)
            .field("query", &self.query)
            .field("entries", &self.entry_count)
            .finish()
    }
}

impl fmt::Display for ProQuestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProQuestDocument('{}')", self.path.display())
    }
}

fn extract_results(html: &Html) -> Vec<ResultRecord> {
    html.select(&selectors().entry).map(parse_entry).collect()
}

/// Extract one record from a `resultItem` element
fn parse_entry(entry: ElementRef<'_>) -> ResultRecord {
    let selectors = selectors();

    let title = entry
        .select(&selectors.title)
        .next()
        .map(|element| element_text(&element));
    let link_details = entry_link(entry, &selectors.fulltext);
    let link_pdf = entry_link(entry, &selectors.pdf);

    let spans: Vec<String> = entry
        .select(&selectors.metadata)
        .map(|element| element_text(&element))
        .collect();
    let EntryMetadata { author, citation } = EntryMetadata::from_spans(&spans);

    let ad = title.as_deref().is_some_and(is_advertisement);

    ResultRecord {
        author,
        publication: citation.publication,
        full_date: citation.date,
        vol: citation.vol,
        issue: citation.issue,
        title: or_placeholder(title),
        pages: citation.pages,
        link_details: or_placeholder(link_details),
        link_pdf: or_placeholder(link_pdf),
        search_query: None,
        ad,
    }
}

/// Resource path of the first anchor matching `selector`
fn entry_link(entry: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let anchor = entry.select(selector).next()?;
    let Some(href) = anchor.value().attr("href") else {
        tracing::warn!("Link anchor without href, treating as missing");
        return None;
    };

    let link = rebuild_link(href);
    if link.is_none() {
        tracing::warn!("Link too short to rebuild, treating as missing: {}", href);
    }
    link
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULLTEXT: &str =
        "https://search.proquest.com/hnpnewyorktimes/docview/98765/fulltext/ABC123/1?accountid=14";
    const PDF: &str =
        "https://search.proquest.com/hnpnewyorktimes/docview/98765/fulltextPDF/ABC123/1?accountid=14";

    fn page(query: &str, entries: &[String]) -> String {
        format!(
            "<html><body><form><textarea id=\"searchTerm\">{}</textarea></form>\
             <ul class=\"resultItems\">{}</ul></body></html>",
            query,
            entries.concat()
        )
    }

    fn entry(title: Option<&str>, spans: &[&str], links: bool) -> String {
        let mut html = String::from("<li class=\"resultItem ltr\">");
        if let Some(title) = title {
            html.push_str(&format!("<h3><a class=\"previewTitle addFlashPageParameterformat_fulltext\" href=\"#\">{}</a></h3>", title));
        }
        for span in spans {
            html.push_str(&format!("<span class=\"titleAuthorETC\">{}</span>", span));
        }
        if links {
            html.push_str(&format!("<a class=\"format_fulltext\" href=\"{}\">Full text</a>", FULLTEXT));
            html.push_str(&format!("<a class=\"format_pdf\" href=\"{}\">Full text - PDF</a>", PDF));
        }
        html.push_str("</li>");
        html
    }

    fn parse(source: String) -> ProQuestDocument {
        ProQuestDocument::from_source("test.html", source, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_query_is_left_trimmed() {
        let document = parse(page("\n   cats AND dogs  ", &[]));
        assert_eq!(document.query(), "cats AND dogs  ");
    }

    #[test]
    fn test_missing_query() {
        let result = ProQuestDocument::from_source(
            "broken.html",
            "<html><body><li class=\"resultItem\"></li></body></html>".to_string(),
            &ParseOptions::default(),
        );
        assert!(matches!(result, Err(DocumentError::MissingQuery(_))));
    }

    #[test]
    fn test_zero_results() {
        let document = parse(page("cats", &[]));
        assert_eq!(document.len(), 0);
        assert!(document.is_empty());
        assert!(document.results().is_empty());
        assert!(document.table().is_empty());
    }

    #[test]
    fn test_full_entry() {
        let document = parse(page(
            "cats",
            &[entry(
                Some("Research on Cats"),
                &["Doe, Jane", "Journal of Feline Studies (1999-2005); Boston Vol.&nbsp;12, Iss.&nbsp;3,&nbsp; (Mar 1, 2001): 45-67."],
                true,
            )],
        ));

        assert_eq!(document.len(), 1);
        let record = &document.results()[0];
        assert_eq!(record.title, "Research on Cats");
        assert_eq!(record.author.as_deref(), Some("Doe, Jane"));
        assert_eq!(record.publication.as_deref(), Some("Journal of Feline Studies"));
        assert_eq!(record.vol.as_deref(), Some("12"));
        assert_eq!(record.issue.as_deref(), Some("3"));
        assert_eq!(record.full_date.as_deref(), Some("Mar 1, 2001"));
        assert_eq!(record.pages.as_deref(), Some("45-67"));
        assert_eq!(
            record.link_details,
            "/hnpnewyorktimes/docview/98765/fulltext/ABC123/1?accountid=14"
        );
        assert_eq!(
            record.link_pdf,
            "/hnpnewyorktimes/docview/98765/fulltextPDF/ABC123/1?accountid=14"
        );
        assert!(!record.ad);
        assert_eq!(record.search_query, None);
    }

    #[test]
    fn test_single_span_has_no_author() {
        let document = parse(page(
            "cats",
            &[entry(Some("Cats"), &["X (Y); Z Vol. V, Iss. I,  (D): P."], false)],
        ));
        let record = &document.results()[0];
        assert_eq!(record.author, None);
        assert_eq!(record.publication.as_deref(), Some("X"));
    }

    #[test]
    fn test_missing_fields_use_policy() {
        let document = parse(page("cats", &[entry(None, &["Display Ad 7 -- No Title"], false)]));
        let record = &document.results()[0];
        assert_eq!(record.title, "None");
        assert_eq!(record.link_details, "None");
        assert_eq!(record.link_pdf, "None");
        assert_eq!(record.publication, None);
        assert_eq!(record.pages, None);
        assert!(!record.ad);
    }

    #[test]
    fn test_malformed_entry_does_not_inherit_author() {
        let document = parse(page(
            "cats",
            &[
                entry(Some("First"), &["Doe, Jane", "X (Y); Z Vol. V, Iss. I,  (D): P."], false),
                entry(Some("Second"), &[], false),
                entry(Some("Third"), &["a", "b", "c"], false),
            ],
        ));

        let results = document.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].author.as_deref(), Some("Doe, Jane"));
        assert_eq!(results[1].author, None);
        assert_eq!(results[1].vol, None);
        assert_eq!(results[2].author, None);
        assert_eq!(results[2].publication, None);
    }

    #[test]
    fn test_ad_detection() {
        let document = parse(page(
            "cats",
            &[
                entry(Some("New ad campaign"), &[], false),
                entry(Some("Advances in Biology"), &[], false),
                entry(Some("Research on Cats"), &[], false),
            ],
        ));
        let ads: Vec<bool> = document.results().iter().map(|r| r.ad).collect();
        assert_eq!(ads, vec![true, true, false]);
    }

    #[test]
    fn test_short_link_is_missing() {
        let source = page(
            "cats",
            &["<li class=\"resultItem\"><a class=\"format_pdf\" href=\"/docview/1\">PDF</a></li>".to_string()],
        );
        let document = parse(source);
        assert_eq!(document.results()[0].link_pdf, "None");
    }

    #[test]
    fn test_results_are_cached() {
        let document = parse(page("cats", &[entry(Some("Cats"), &[], false)]));
        let first = document.results().as_ptr();
        let second = document.results().as_ptr();
        assert_eq!(first, second);
        assert_eq!(document.table().len(), 1);
    }

    #[test]
    fn test_into_results() {
        let document = parse(page("cats", &[entry(Some("Cats"), &[], false)]));
        let results = document.into_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Cats");
    }

    #[test]
    fn test_keep_raw() {
        let source = page("cats", &[]);
        let kept = ProQuestDocument::from_source(
            "a.html",
            source.clone(),
            &ParseOptions::default().keep_raw(true),
        )
        .unwrap();
        assert_eq!(kept.raw(), Some(source.as_str()));

        let dropped = parse(source);
        assert_eq!(dropped.raw(), None);
    }

    #[test]
    fn test_open_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProQuestDocument::open(dir.path());
        assert!(matches!(result, Err(DocumentError::NotAFile(_))));
    }

    #[test]
    fn test_open_rejects_missing_file() {
        let result = ProQuestDocument::open("/nonexistent/page.html");
        assert!(matches!(result, Err(DocumentError::NotAFile(_))));
    }

    #[test]
    fn test_display() {
        let document = parse(page("cats", &[]));
        assert_eq!(document.to_string(), "ProQuestDocument('test.html')");
    }
}
