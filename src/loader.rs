//! CSV loading into header-normalized rows.

use std::collections::HashMap;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::normalize::{clean_cell, normalize_header};

/// One data row keyed by normalized column name.
#[derive(Debug, Clone, Default)]
pub struct Row {
    line: u64,
    fields: HashMap<String, String>,
}

impl Row {
    pub fn new(line: u64, fields: HashMap<String, String>) -> Self {
        Self { line, fields }
    }

    /// Builds a row from `(column, value)` pairs, normalizing both.
    pub fn from_pairs<'a>(line: u64, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (normalize_header(k), v.trim().to_string()))
            .collect();
        Self { line, fields }
    }

    /// 1-based line number in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Returns the trimmed value for `column`; empty cells read as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(|v| clean_cell(v))
    }
}

/// A parsed leaderboard file: normalized headers in file order, and its rows.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Reads `path` as a UTF-8 CSV with a header row.
///
/// # Errors
///
/// Returns [`IngestError::NoHeaderRow`] for an empty file, or the underlying
/// CSV/IO error if the file cannot be read.
pub fn load_csv(path: impl AsRef<Path>) -> Result<LeaderboardCsv> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderRow);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        // Extra cells past the header width are dropped; missing ones stay absent.
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.trim().to_string()))
            .collect();
        rows.push(Row::new(line, fields));
    }

    debug!(path = %path.display(), headers = headers.len(), rows = rows.len(), "CSV loaded");
    Ok(LeaderboardCsv { headers, rows })
}
