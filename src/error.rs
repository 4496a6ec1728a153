// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Error taxonomy for configuration, validation, transport, join consistency and output failures
// role: errors/types
// outputs: DownloadError enum used by every module; anyhow wraps it at the binary edge
// invariants: Every variant is fatal; enrichment misses are never represented here
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
  #[error("{0}")]
  Configuration(String),

  #[error("{0}")]
  Validation(String),

  #[error("Unable to build Google Analytics authorization: {0}")]
  Authentication(String),

  #[error("reporting request failed: {0}")]
  Transport(String),

  #[error("malformed report for [{dimensions}]: row {row} has {found} cells, header has {expected}")]
  MalformedReport {
    dimensions: String,
    row: usize,
    found: usize,
    expected: usize,
  },

  #[error("pagination did not terminate after {max_pages} pages for [{dimensions}]")]
  PaginationLimit { dimensions: String, max_pages: usize },

  #[error("result but no user found with {column} value of {key}")]
  JoinConsistency { column: String, key: String },

  #[error("writing {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl DownloadError {
  pub fn config(msg: impl Into<String>) -> Self {
    Self::Configuration(msg.into())
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation(_))
  }
}

pub type Result<T, E = DownloadError> = std::result::Result<T, E>;
