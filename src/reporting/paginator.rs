// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drive a ReportingApi page by page until the cursor chain ends, accumulating one complete ReportTable
// role: reporting/paginator
// inputs: ReportingApi, ReportQuery, page limit
// outputs: ReportTable (header from the first page, data rows from every page in server order)
// invariants:
// - the first request carries no page token; each later request carries the previous page's token
// - cell values are reduced to ASCII (other characters are dropped, never an error)
// - every data row has exactly as many cells as the header
// - more than max_pages pages is fatal
// errors: API errors propagate unchanged; no retries, no partial tables
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::error::{DownloadError, Result};
use crate::model::{ReportTable, Row};
use crate::reporting::api::{ReportQuery, ReportingApi};
use crate::util::ascii_lossy;

fn decode_row(row: Row) -> Row {
  row.iter().map(|cell| ascii_lossy(cell)).collect()
}

/// Fetch every page of one report.
pub fn fetch_full_report(api: &dyn ReportingApi, query: &ReportQuery<'_>, max_pages: usize) -> Result<ReportTable> {
  let label = query.dimensions.label();

  let mut header: Option<Row> = None;
  let mut rows: Vec<Row> = Vec::new();
  let mut token: Option<String> = None;
  let mut pages = 0usize;

  loop {
    if pages == max_pages {
      return Err(DownloadError::PaginationLimit {
        dimensions: label,
        max_pages,
      });
    }

    let page = api.request_page(query, token.as_deref())?;
    pages += 1;

    let header = header.get_or_insert_with(|| {
      if page.header.is_empty() {
        query.dimensions.names().to_vec()
      } else {
        page.header.clone()
      }
    });

    let page_rows = page.rows.len();
    for row in page.rows {
      if row.len() != header.len() {
        return Err(DownloadError::MalformedReport {
          dimensions: label,
          row: rows.len() + 1,
          found: row.len(),
          expected: header.len(),
        });
      }
      rows.push(decode_row(row));
    }

    match page.next_page_token {
      Some(next) => {
        tracing::debug!(dimensions = %label, page = pages, rows = page_rows, next = %next, "page fetched");
        token = Some(next);
      }
      None => {
        tracing::debug!(dimensions = %label, page = pages, rows = page_rows, "page fetched (no next page)");
        break;
      }
    }
  }

  tracing::debug!(dimensions = %label, pages, rows = rows.len(), "report complete");

  Ok(ReportTable::new(header.unwrap_or_default(), rows))
}
