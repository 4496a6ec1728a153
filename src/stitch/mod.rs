// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Combine users, results and batch reports into the single output table
// role: stitch/orchestration
// inputs: Users/results ReportTables, auxiliary ReportTables in configured order, StitchPlan (policy, stitch dims, sentinel)
// outputs: ReportTable with header users[1..] ++ results[1..] ++ each batch header minus its stitch columns
// invariants:
// - exactly one output row per results row, in results order
// - enrichment reads the full results row (key column included)
// - a batch miss appends the sentinel once per batch column
// errors: JoinConsistency from the primary join; Configuration from policy construction
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod policy;
pub mod primary;

use crate::config::PolicyKind;
use crate::error::Result;
use crate::model::{DimensionSet, ReportTable, Row};

use self::policy::{build_policy, EnrichmentPolicy};
use self::primary::join_primary;

/// What the enrichment step needs from the configuration.
#[derive(Debug, Clone, Copy)]
pub struct StitchPlan<'a> {
  pub policy: PolicyKind,
  pub stitch_dimensions: &'a [String],
  pub results_dimensions: &'a DimensionSet,
  pub sentinel: &'a str,
}

/// Primary join plus enrichment from every auxiliary table.
pub fn combine(
  users: &ReportTable,
  results: &ReportTable,
  auxiliary: &[ReportTable],
  plan: &StitchPlan<'_>,
) -> Result<ReportTable> {
  let (mut header, joined) = join_primary(users, results)?.into_parts();

  let policies: Vec<Box<dyn EnrichmentPolicy + '_>> = auxiliary
    .iter()
    .map(|aux| build_policy(plan.policy, aux, plan.stitch_dimensions, plan.results_dimensions))
    .collect::<Result<_>>()?;

  for p in &policies {
    header.extend(p.header().iter().cloned());
  }

  let mut hits = vec![0usize; policies.len()];
  let mut rows: Vec<Row> = Vec::with_capacity(joined.len());

  for (mut row, result) in joined.into_iter().zip(results.rows()) {
    row.reserve(header.len().saturating_sub(row.len()));

    for (n, p) in policies.iter().enumerate() {
      match p.match_row(result) {
        Some(found) => {
          hits[n] += 1;
          row.extend(found.iter().cloned());
        }
        None => row.extend(std::iter::repeat(plan.sentinel.to_string()).take(p.width())),
      }
    }

    rows.push(row);
  }

  for (n, h) in hits.iter().enumerate() {
    tracing::debug!(batch = n + 1, hits = h, misses = rows.len() - h, "enrichment");
  }

  Ok(ReportTable::new(header, rows))
}
