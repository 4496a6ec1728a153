// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Match auxiliary (batch) report rows onto results rows under one configured enrichment policy
// role: stitch/enrichment-policy
// inputs: One auxiliary ReportTable (stitch columns first), stitch dimension names, results dimension set
// outputs: EnrichmentPolicy implementations: ExactStitch (composite key) and NearestPreceding (user + time offset)
// invariants:
// - appended header = auxiliary header minus its leading stitch columns
// - a hit returns the auxiliary row minus its stitch columns; a miss is None, never an error
// - duplicate keys (or equal offsets for one user) keep the last row and log a warning
// - NearestPreceding picks the greatest offset <= the row's offset and misses when none qualifies
// errors: Only construction can fail (stitch dimension absent from the results dimensions)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use crate::config::PolicyKind;
use crate::error::{DownloadError, Result};
use crate::model::{DimensionSet, ReportTable};

/// One auxiliary dimension set, ready to enrich results rows.
pub trait EnrichmentPolicy {
  /// Columns appended to the output header.
  fn header(&self) -> &[String];

  /// Number of appended columns; the sentinel is repeated this many times on a miss.
  fn width(&self) -> usize {
    self.header().len()
  }

  /// The auxiliary remainder for a full results row, or `None` on a miss.
  fn match_row(&self, results_row: &[String]) -> Option<&[String]>;
}

fn result_positions(stitch: &[String], results_dims: &DimensionSet) -> Result<Vec<usize>> {
  stitch
    .iter()
    .map(|name| {
      results_dims.position(name).ok_or_else(|| {
        DownloadError::config(format!("Stitch dimension {name} is not one of the results dimensions"))
      })
    })
    .collect()
}

fn cell(row: &[String], idx: usize) -> &str {
  row.get(idx).map(String::as_str).unwrap_or("")
}

fn tail(row: &[String], from: usize) -> &[String] {
  row.get(from..).unwrap_or(&[])
}

/// Exact match on every stitch column; the composite key is the tuple of stitch values.
pub struct ExactStitch<'a> {
  positions: Vec<usize>,
  width: usize,
  aux: &'a ReportTable,
  header: &'a [String],
  index: HashMap<Vec<&'a str>, usize>,
}

impl<'a> ExactStitch<'a> {
  pub fn new(aux: &'a ReportTable, stitch: &[String], results_dims: &DimensionSet) -> Result<Self> {
    let positions = result_positions(stitch, results_dims)?;
    let width = stitch.len();
    let mut index = HashMap::with_capacity(aux.row_count());

    for (n, row) in aux.rows().iter().enumerate() {
      let key: Vec<&'a str> = (0..width).map(|i| cell(row, i)).collect();
      if let Some(prev) = index.insert(key, n) {
        tracing::warn!(
          row = ?&row[..width.min(row.len())],
          replaced = prev + 1,
          "duplicate stitch key in batch report; keeping the last row"
        );
      }
    }

    Ok(Self {
      positions,
      width,
      aux,
      header: tail(aux.header(), width),
      index,
    })
  }
}

impl EnrichmentPolicy for ExactStitch<'_> {
  fn header(&self) -> &[String] {
    self.header
  }

  fn match_row(&self, results_row: &[String]) -> Option<&[String]> {
    let key: Vec<&str> = self.positions.iter().map(|&i| cell(results_row, i)).collect();
    let n = *self.index.get(key.as_slice())?;
    self.aux.rows().get(n).map(|row| tail(row, self.width))
  }
}

/// Per user, the auxiliary row with the greatest time offset not after the results row's offset.
pub struct NearestPreceding<'a> {
  user_pos: usize,
  offset_pos: usize,
  header: &'a [String],
  by_user: HashMap<&'a str, BTreeMap<i64, &'a [String]>>,
}

fn parse_offset(raw: &str) -> Option<i64> {
  raw.trim().parse::<i64>().ok()
}

impl<'a> NearestPreceding<'a> {
  pub fn new(aux: &'a ReportTable, stitch: &[String], results_dims: &DimensionSet) -> Result<Self> {
    if stitch.len() != 2 {
      return Err(DownloadError::config(format!(
        "nearest-time enrichment needs exactly two stitch dimensions (user id, time offset), found {}",
        stitch.len()
      )));
    }
    let positions = result_positions(stitch, results_dims)?;
    let mut by_user: HashMap<&'a str, BTreeMap<i64, &'a [String]>> = HashMap::new();
    let mut skipped = 0usize;

    for row in aux.rows() {
      let Some(offset) = parse_offset(cell(row, 1)) else {
        skipped += 1;
        continue;
      };
      let user = cell(row, 0);
      if by_user.entry(user).or_default().insert(offset, tail(row, 2)).is_some() {
        tracing::warn!(user, offset, "duplicate time offset in batch report; keeping the last row");
      }
    }

    if skipped > 0 {
      tracing::warn!(skipped, dimension = %stitch[1], "batch rows with a non-numeric time offset were skipped");
    }

    Ok(Self {
      user_pos: positions[0],
      offset_pos: positions[1],
      header: tail(aux.header(), 2),
      by_user,
    })
  }
}

impl EnrichmentPolicy for NearestPreceding<'_> {
  fn header(&self) -> &[String] {
    self.header
  }

  fn match_row(&self, results_row: &[String]) -> Option<&[String]> {
    let offsets = self.by_user.get(cell(results_row, self.user_pos))?;
    let at = parse_offset(cell(results_row, self.offset_pos))?;
    offsets.range(..=at).next_back().map(|(_, row)| *row)
  }
}

pub fn build_policy<'a>(
  kind: PolicyKind,
  aux: &'a ReportTable,
  stitch: &[String],
  results_dims: &DimensionSet,
) -> Result<Box<dyn EnrichmentPolicy + 'a>> {
  Ok(match kind {
    PolicyKind::Stitch => Box::new(ExactStitch::new(aux, stitch, results_dims)?),
    PolicyKind::NearestTime => Box::new(NearestPreceding::new(aux, stitch, results_dims)?),
  })
}
