//! Resolution of aggregator inputs to a concrete list of documents.

use std::path::{Path, PathBuf};

use super::AggregateError;
use crate::config::ParseOptions;

/// Where the documents of a [`ResultSet`](super::ResultSet) come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// An explicit list of document paths, used as given
    Files(Vec<PathBuf>),
    /// Every file directly inside one directory
    Directory(PathBuf),
    /// Every file directly inside each directory, in list order
    Directories(Vec<PathBuf>),
}

impl InputSource {
    pub fn files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        InputSource::Files(paths.into_iter().map(Into::into).collect())
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        InputSource::Directory(path.into())
    }

    pub fn directories<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        InputSource::Directories(paths.into_iter().map(Into::into).collect())
    }
}

/// Resolve an input source to document paths
///
/// Directories contribute the regular files directly inside them, minus
/// block-listed names, in file-name order. Explicit file lists are not checked
/// here; a bad entry fails when its document is opened.
pub fn resolve_inputs(
    source: &InputSource,
    options: &ParseOptions,
) -> Result<Vec<PathBuf>, AggregateError> {
    match source {
        InputSource::Files(files) => Ok(files.clone()),
        InputSource::Directory(dir) => scan_directory(dir, options),
        InputSource::Directories(dirs) => {
            let mut files = Vec::new();
            for dir in dirs {
                files.extend(scan_directory(dir, options)?);
            }
            Ok(files)
        }
    }
}

fn scan_directory(dir: &Path, options: &ParseOptions) -> Result<Vec<PathBuf>, AggregateError> {
    let read_error = |source: std::io::Error| AggregateError::Directory {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if options.is_stopfile(&entry.file_name()) {
            tracing::debug!("Skipping block-listed file {}", path.display());
            continue;
        }
        files.push(path);
    }

    files.sort();
    tracing::debug!("Found {} files in {}", files.len(), dir.display());
    Ok(files)
}
