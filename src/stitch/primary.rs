// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Primary join of the results report onto the users report by their shared first column
// role: stitch/primary-join
// inputs: Users and results ReportTables whose first columns hold the same dimension
// outputs: UsersIndex lookups and the joined table (users remainder ++ results remainder)
// invariants:
// - the key column never appears in the output
// - output rows follow the results order, one per results row
// - a results key without a user row aborts the join
// errors: DownloadError::JoinConsistency naming the key column and the offending value
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use crate::error::{DownloadError, Result};
use crate::model::{ReportTable, Row};

/// Split a row into its key cell and the remaining cells.
pub fn split_key(row: &[String]) -> (&str, &[String]) {
  match row.split_first() {
    Some((key, rest)) => (key.as_str(), rest),
    None => ("", &[][..]),
  }
}

/// Users rows by key value; values are the row minus its key column.
pub struct UsersIndex<'a> {
  column: &'a str,
  rows: HashMap<&'a str, &'a [String]>,
}

impl<'a> UsersIndex<'a> {
  pub fn new(users: &'a ReportTable) -> Self {
    let (column, _) = split_key(users.header());
    let mut rows = HashMap::with_capacity(users.row_count());

    for row in users.rows() {
      let (key, rest) = split_key(row);
      if rows.insert(key, rest).is_some() {
        tracing::warn!(column, key, "duplicate user key; keeping the last row");
      }
    }

    Self { column, rows }
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  /// The user remainder for `key`; a miss is a consistency violation.
  pub fn remainder(&self, key: &str) -> Result<&'a [String]> {
    self.rows.get(key).copied().ok_or_else(|| DownloadError::JoinConsistency {
      column: self.column.to_string(),
      key: key.to_string(),
    })
  }
}

/// `users.header[1..] ++ results.header[1..]`.
pub fn primary_header(users: &ReportTable, results: &ReportTable) -> Row {
  let (_, user_cols) = split_key(users.header());
  let (_, result_cols) = split_key(results.header());
  user_cols.iter().chain(result_cols).cloned().collect()
}

/// Join users and results without enrichment.
pub fn join_primary(users: &ReportTable, results: &ReportTable) -> Result<ReportTable> {
  let index = UsersIndex::new(users);
  let mut rows = Vec::with_capacity(results.row_count());

  for row in results.rows() {
    let (key, rest) = split_key(row);
    let user = index.remainder(key)?;
    rows.push(user.iter().chain(rest).cloned().collect());
  }

  tracing::debug!(users = index.len(), results = rows.len(), "primary join");

  Ok(ReportTable::new(primary_header(users, results), rows))
}
