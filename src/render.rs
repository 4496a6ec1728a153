// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Render a ReportTable as delimited text with an optionally translated header, to a file or stdout
// role: output/render
// inputs: ReportTable, OutputOptions (path, delimiter, header mode), custom dimension labels
// outputs: Delimited text; a completion line on stdout when writing to a file
// side_effects: Creates/truncates the output file; writes to stdout
// invariants:
// - data rows are written unchanged and in order
// - header translation only touches cells listed in custom-dimensions
// - records end with "\n"; quoting is minimal
// errors: IO failures are DownloadError::Io with the target path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{DownloadError, Result};
use crate::model::{ReportTable, Row};

/// How the header row is emitted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeaderMode {
  /// No header row at all.
  Skip,
  /// Raw dimension ids.
  Raw,
  /// Custom dimension labels where configured.
  Labels,
  /// `label (raw id)` where configured.
  LabelsWithNames,
}

#[derive(Clone, Debug)]
pub struct OutputOptions {
  pub path: Option<PathBuf>,
  pub delimiter: u8,
  pub header: HeaderMode,
}

impl Default for OutputOptions {
  fn default() -> Self {
    Self {
      path: None,
      delimiter: b',',
      header: HeaderMode::Labels,
    }
  }
}

/// Apply custom dimension labels to a header row.
pub fn translate_header(header: &[String], labels: &[(String, String)], mode: HeaderMode) -> Row {
  header
    .iter()
    .map(|raw| {
      let label = labels.iter().find(|(k, _)| k == raw).map(|(_, v)| v);
      match (mode, label) {
        (HeaderMode::Labels, Some(l)) => l.clone(),
        (HeaderMode::LabelsWithNames, Some(l)) => format!("{l} ({raw})"),
        _ => raw.clone(),
      }
    })
    .collect()
}

/// Write the table; returns the number of records written (header included).
pub fn write_table<W: Write>(
  out: W,
  table: &ReportTable,
  labels: &[(String, String)],
  opts: &OutputOptions,
) -> std::result::Result<usize, csv::Error> {
  let mut wtr = csv::WriterBuilder::new()
    .delimiter(opts.delimiter)
    .terminator(csv::Terminator::Any(b'\n'))
    .from_writer(out);
  let mut written = 0usize;

  if opts.header != HeaderMode::Skip {
    wtr.write_record(translate_header(table.header(), labels, opts.header))?;
    written += 1;
  }

  for row in table.rows() {
    wtr.write_record(row)?;
    written += 1;
  }

  wtr.flush()?;

  Ok(written)
}

fn io_error(path: &Path, e: csv::Error) -> DownloadError {
  let source = match e.into_kind() {
    csv::ErrorKind::Io(io) => io,
    other => std::io::Error::other(format!("{other:?}")),
  };
  DownloadError::Io {
    path: path.to_path_buf(),
    source,
  }
}

/// Write to the configured file (with a completion line) or to stdout.
pub fn output_table(table: &ReportTable, labels: &[(String, String)], opts: &OutputOptions) -> Result<()> {
  match &opts.path {
    Some(path) => {
      let file = std::fs::File::create(path).map_err(|source| DownloadError::Io {
        path: path.clone(),
        source,
      })?;
      let written = write_table(std::io::BufWriter::new(file), table, labels, opts).map_err(|e| io_error(path, e))?;
      tracing::debug!(path = %path.display(), rows = written, "output written");
      println!("Download complete, {} rows, output file: {}", written, path.display());
    }
    None => {
      let stdout = std::io::stdout();
      write_table(stdout.lock(), table, labels, opts).map_err(|e| io_error(Path::new("<stdout>"), e))?;
    }
  }

  Ok(())
}
