// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the tabular model (dimension sets, rows, report tables, pages) shared by fetching, stitching and rendering
// role: model/types
// outputs: DimensionSet, Row, ReportTable, Page
// invariants: DimensionSet is never empty; ReportTable keeps the header apart from data rows
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::error::{DownloadError, Result};

/// One row of cell values, positionally aligned to a header or dimension set.
pub type Row = Vec<String>;

/// Ordered dimension names for one report request. The first entry is the join key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSet {
  names: Vec<String>,
}

impl DimensionSet {
  pub fn new(names: Vec<String>) -> Result<Self> {
    if names.is_empty() {
      return Err(DownloadError::config("dimension set must not be empty"));
    }
    Ok(Self { names })
  }

  pub fn names(&self) -> &[String] {
    &self.names
  }

  pub fn key(&self) -> &str {
    &self.names[0]
  }

  pub fn position(&self, name: &str) -> Option<usize> {
    self.names.iter().position(|n| n == name)
  }

  /// `leading ++ self`, e.g. stitch dimensions in front of a batch set.
  pub fn prefixed_with(&self, leading: &[String]) -> DimensionSet {
    let mut names = leading.to_vec();
    names.extend(self.names.iter().cloned());
    DimensionSet { names }
  }

  /// Comma-joined names; used in logs and as the fixture lookup key.
  pub fn label(&self) -> String {
    self.names.join(",")
  }
}

/// A fully fetched report: one header row plus data rows in server order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportTable {
  header: Row,
  rows: Vec<Row>,
}

impl ReportTable {
  pub fn new(header: Row, rows: Vec<Row>) -> Self {
    Self { header, rows }
  }

  /// Build from the `[header, data...]` layout used in tests.
  #[cfg(test)]
  pub fn from_rows(mut all: Vec<Row>) -> Self {
    if all.is_empty() {
      return Self::default();
    }
    let header = all.remove(0);
    Self { header, rows: all }
  }

  pub fn header(&self) -> &Row {
    &self.header
  }

  pub fn rows(&self) -> &[Row] {
    &self.rows
  }

  /// Number of data rows (header excluded).
  pub fn row_count(&self) -> usize {
    self.rows.len()
  }

  pub fn into_parts(self) -> (Row, Vec<Row>) {
    (self.header, self.rows)
  }

  /// `[header, data...]`, the inverse of `from_rows`.
  #[cfg(test)]
  pub fn to_rows(&self) -> Vec<Row> {
    let mut out = Vec::with_capacity(self.rows.len() + 1);
    out.push(self.header.clone());
    out.extend(self.rows.iter().cloned());
    out
  }
}

/// One page returned by the reporting service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
  pub header: Row,
  pub rows: Vec<Row>,
  pub next_page_token: Option<String>,
}
