// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Small helpers: lossy ASCII decoding of cell values, output path probing, man page rendering
// role: utilities/helpers
// inputs: Cell strings; output paths; clap CommandFactory
// outputs: ASCII-only strings, validated paths, man page text
// side_effects: probe_output_path creates and removes the probed file when it did not exist
// invariants:
// - ascii_lossy never fails; it only drops characters
// - probe_output_path leaves no file behind unless one existed before
// errors: Probe failures surface as validation errors naming the path
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use clap::CommandFactory;

use crate::error::{DownloadError, Result};

/// Drop every non-ASCII character.
pub fn ascii_lossy(s: &str) -> String {
  s.chars().filter(char::is_ascii).collect()
}

/// Check that `path` can be created, before any report is fetched.
pub fn probe_output_path(path: &Path) -> Result<()> {
  if path.is_file() {
    return Ok(());
  }

  let invalid = || DownloadError::validation(format!("Invalid output file: {}", path.display()));

  std::fs::File::create(path).map_err(|_| invalid())?;
  std::fs::remove_file(path).map_err(|_| invalid())?;

  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
