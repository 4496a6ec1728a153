// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for talking to the reporting service (page requests and pagination)
// role: reporting/namespace
// outputs: ReportingApi seam, client selection, fetch_full_report
// invariants: Requests are strictly sequential; any service error is fatal to the run
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod paginator;

pub use api::{build_api, ReportQuery, ReportingApi};
pub use paginator::fetch_full_report;
