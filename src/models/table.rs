//! In-memory tabular view over result records, with CSV export.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::record::{ResultRecord, COLUMNS, SEARCH_QUERY_COLUMN};
use crate::utils::{duplicate_indices, find_duplicates};

/// A single cell of a [`ResultTable`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Bool(bool),
}

impl Value {
    /// Render the cell the way it is written to CSV
    ///
    /// Missing values become empty fields and booleans are spelled `True` / `False`.
    pub fn to_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::Text).unwrap_or(Value::Null)
    }
}

/// One table row with the index it had when the table was built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub index: usize,
    pub values: Vec<Value>,
}

/// Tabular view over a sequence of records
///
/// Columns are named after the record fields, rows follow record order. The
/// `search_query` column is only present when at least one record carries a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    columns: Vec<&'static str>,
    rows: Vec<Row>,
}

impl ResultTable {
    /// Build a table from records
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let with_query = records.iter().any(|r| r.search_query.is_some());
        let columns: Vec<&'static str> = COLUMNS
            .iter()
            .copied()
            .filter(|name| with_query || *name != SEARCH_QUERY_COLUMN)
            .collect();

        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| Row {
                index,
                values: columns
                    .iter()
                    .map(|c| record.value(c).unwrap_or(Value::Null))
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let position = self.columns.iter().position(|c| *c == name)?;
        Some(self.rows.iter().map(|row| &row.values[position]).collect())
    }

    /// Drop rows whose values are all equal to another row's
    ///
    /// The first row of each group survives and keeps its original index.
    /// Returns the number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        let values: Vec<&Vec<Value>> = self.rows.iter().map(|row| &row.values).collect();
        let groups = find_duplicates(&values);
        if groups.is_empty() {
            return 0;
        }

        let to_remove = duplicate_indices(&groups);
        let before = self.rows.len();
        let mut position = 0;
        self.rows.retain(|_| {
            let keep = !to_remove.contains(&position);
            position += 1;
            keep
        });

        before - self.rows.len()
    }

    /// Write the table as CSV with a leading unnamed index column
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = vec![""];
        header.extend(self.columns.iter().copied());
        csv.write_record(&header)?;

        for row in &self.rows {
            let mut fields = vec![row.index.to_string()];
            fields.extend(row.values.iter().map(Value::to_field));
            csv.write_record(&fields)?;
        }

        csv.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file, creating parent directories as needed
    pub fn save_csv(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))?;
        tracing::info!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }
}

/// Errors that can occur when exporting a table
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
