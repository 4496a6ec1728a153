// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load the TOML configuration file and derive validated, immutable Settings for one run
// role: configuration/loader
// inputs: Path to download.toml (flag, GA_DOWNLOAD_CONFIG, or ./download.toml)
// outputs: ConfigSource (section/key lookups) and Settings (typed values, dimension sets, enrichment policy)
// invariants:
// - user and results dimension sets share their first dimension
// - stitch dimensions are a subset of the results dimensions
// - nearest-time enrichment uses exactly two stitch dimensions
// - dimension names always carry the ga: prefix
// errors: Every failure is DownloadError::Configuration and is raised before any report is fetched
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use crate::error::{DownloadError, Result};
use crate::model::DimensionSet;

pub const DEFAULT_CONFIG_FILE: &str = "download.toml";
pub const CONFIG_ENV: &str = "GA_DOWNLOAD_CONFIG";
pub const DEFAULT_ENDPOINT: &str = "https://analyticsreporting.googleapis.com/v4/reports:batchGet";
pub const DEFAULT_METRIC: &str = "ga:users";
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Batch sections are `batch-dimensions-1` up to `batch-dimensions-{MAX_DIM_BATCHES - 1}`.
pub const MAX_DIM_BATCHES: usize = 20;

/// Raw section/key access over the parsed TOML document.
#[derive(Debug, Clone)]
pub struct ConfigSource {
  doc: toml::Table,
}

fn scalar_string(v: &toml::Value) -> Option<String> {
  match v {
    toml::Value::String(s) => Some(s.clone()),
    toml::Value::Integer(i) => Some(i.to_string()),
    toml::Value::Float(f) => Some(f.to_string()),
    toml::Value::Boolean(b) => Some(b.to_string()),
    _ => None,
  }
}

impl ConfigSource {
  pub fn load(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path)
      .map_err(|e| DownloadError::config(format!("Unable to read configuration file {}: {e}", path.display())))?;
    Self::parse(&text).map_err(|e| DownloadError::config(format!("{} ({})", e, path.display())))
  }

  pub fn parse(text: &str) -> Result<Self> {
    let doc: toml::Table =
      toml::from_str(text).map_err(|e| DownloadError::config(format!("Invalid configuration file: {e}")))?;
    Ok(Self { doc })
  }

  pub fn has_section(&self, section: &str) -> bool {
    self.section(section).is_some()
  }

  fn section(&self, section: &str) -> Option<&toml::Table> {
    self.doc.get(section).and_then(|v| v.as_table())
  }

  fn required_section(&self, section: &str, required: bool) -> Result<Option<&toml::Table>> {
    match self.section(section) {
      Some(t) => Ok(Some(t)),
      None if required => Err(DownloadError::config(format!("Missing configuration section: {section}"))),
      None => Ok(None),
    }
  }

  /// Scalar lookup; non-string scalars are rendered as strings.
  pub fn value(&self, section: &str, key: &str, required: bool) -> Result<Option<String>> {
    let Some(table) = self.required_section(section, required)? else {
      return Ok(None);
    };

    match table.get(key) {
      Some(v) => scalar_string(v)
        .map(Some)
        .ok_or_else(|| DownloadError::config(format!("Configuration option {section}:{key} must be a scalar"))),
      None if required => Err(DownloadError::config(format!("Missing configuration option: {section}:{key}"))),
      None => Ok(None),
    }
  }

  /// The section's values in file order; option keys are ignored and arrays are flattened.
  pub fn list(&self, section: &str, required: bool) -> Result<Vec<String>> {
    let Some(table) = self.required_section(section, required)? else {
      return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(table.len());

    for (key, v) in table {
      match v {
        toml::Value::Array(items) => {
          for item in items {
            let s = scalar_string(item).ok_or_else(|| {
              DownloadError::config(format!("Configuration option {section}:{key} must hold scalar values"))
            })?;
            out.push(s);
          }
        }
        other => {
          let s = scalar_string(other)
            .ok_or_else(|| DownloadError::config(format!("Configuration option {section}:{key} must be a scalar")))?;
          out.push(s);
        }
      }
    }

    Ok(out)
  }

  /// The section's key/value pairs in file order.
  pub fn dict(&self, section: &str, required: bool) -> Result<Vec<(String, String)>> {
    let Some(table) = self.required_section(section, required)? else {
      return Ok(Vec::new());
    };

    table
      .iter()
      .map(|(k, v)| {
        scalar_string(v)
          .map(|s| (k.clone(), s))
          .ok_or_else(|| DownloadError::config(format!("Configuration option {section}:{k} must be a scalar")))
      })
      .collect()
  }
}

/// Prefix a bare dimension id with `ga:`.
pub fn ga_name(raw: &str) -> String {
  let raw = raw.trim();
  if raw.starts_with("ga:") {
    raw.to_string()
  } else {
    format!("ga:{raw}")
  }
}

/// Config path precedence: explicit flag, then `GA_DOWNLOAD_CONFIG`, then `./download.toml`.
pub fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
  if let Some(p) = flag {
    return p.to_path_buf();
  }
  match std::env::var(CONFIG_ENV) {
    Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
    _ => PathBuf::from(DEFAULT_CONFIG_FILE),
  }
}

/// How auxiliary (batch) rows are matched onto the primary join.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolicyKind {
  /// Exact match on the composite stitch key.
  Stitch,
  /// Same user, greatest time offset not after the primary row's offset.
  NearestTime,
}

impl PolicyKind {
  fn parse(s: &str) -> Result<Self> {
    match s.trim() {
      "stitch" => Ok(PolicyKind::Stitch),
      "nearest-time" => Ok(PolicyKind::NearestTime),
      other => Err(DownloadError::config(format!(
        "Unknown enrichment_policy \"{other}\" (expected \"stitch\" or \"nearest-time\")"
      ))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Settings {
  pub view_id: String,
  pub page_size: u32,
  pub invalid_value: String,
  pub endpoint: String,
  pub access_token: Option<String>,
  pub max_pages: usize,
  pub metric: String,
  pub policy: PolicyKind,
  pub custom_dimensions: Vec<(String, String)>,
  pub stitch_dimensions: Vec<String>,
  pub user_dimensions: DimensionSet,
  pub results_dimensions: DimensionSet,
  pub batch_dimensions: Vec<DimensionSet>,
}

fn positive<T: std::str::FromStr + PartialOrd + Default>(raw: &str, what: &str) -> Result<T> {
  match raw.trim().parse::<T>() {
    Ok(v) if v > T::default() => Ok(v),
    _ => Err(DownloadError::config(format!("{what} must be a positive integer, got \"{raw}\""))),
  }
}

fn dimension_list(src: &ConfigSource, section: &str) -> Result<Vec<String>> {
  Ok(src.list(section, true)?.iter().map(|d| ga_name(d)).collect())
}

fn dimension_set(src: &ConfigSource, section: &str) -> Result<DimensionSet> {
  DimensionSet::new(dimension_list(src, section)?)
    .map_err(|_| DownloadError::config(format!("Configuration section {section} must list at least one dimension")))
}

impl Settings {
  pub fn load(path: &Path) -> Result<Self> {
    Self::from_source(&ConfigSource::load(path)?)
  }

  pub fn from_source(src: &ConfigSource) -> Result<Self> {
    let required = |key: &str| -> Result<String> {
      src
        .value("common", key, true)?
        .ok_or_else(|| DownloadError::config(format!("Missing configuration option: common:{key}")))
    };

    let view_id = required("view_id")?;
    let page_size: u32 = positive(&required("max_results")?, "common:max_results")?;
    let invalid_value = required("invalid_value")?;

    let endpoint = src
      .value("common", "endpoint", false)?
      .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let access_token = src
      .value("common", "access_token", false)?
      .filter(|t| !t.trim().is_empty());
    let max_pages = match src.value("common", "max_pages", false)? {
      Some(raw) => positive(&raw, "common:max_pages")?,
      None => DEFAULT_MAX_PAGES,
    };
    let metric = src
      .value("common", "metric", false)?
      .map(|m| ga_name(&m))
      .unwrap_or_else(|| DEFAULT_METRIC.to_string());
    let policy = match src.value("common", "enrichment_policy", false)? {
      Some(raw) => PolicyKind::parse(&raw)?,
      None => PolicyKind::Stitch,
    };

    let custom_dimensions = src
      .dict("custom-dimensions", true)?
      .into_iter()
      .map(|(k, v)| (ga_name(&k), v))
      .collect();
    let stitch_dimensions = dimension_list(src, "stitch-dimensions")?;
    let user_dimensions = dimension_set(src, "user-dimensions")?;
    let results_dimensions = dimension_set(src, "results-dimensions")?;

    if user_dimensions.key() != results_dimensions.key() {
      return Err(DownloadError::config("First dimension of user and result groups must be equal"));
    }

    let mut batch_dimensions = Vec::new();
    for n in 1..MAX_DIM_BATCHES {
      let section = format!("batch-dimensions-{n}");
      if src.has_section(&section) {
        batch_dimensions.push(dimension_set(src, &section)?);
      }
    }

    let settings = Settings {
      view_id,
      page_size,
      invalid_value,
      endpoint,
      access_token,
      max_pages,
      metric,
      policy,
      custom_dimensions,
      stitch_dimensions,
      user_dimensions,
      results_dimensions,
      batch_dimensions,
    };
    settings.validate_stitching()?;

    Ok(settings)
  }

  fn validate_stitching(&self) -> Result<()> {
    if let Some(missing) = self
      .stitch_dimensions
      .iter()
      .find(|d| self.results_dimensions.position(d).is_none())
    {
      return Err(DownloadError::config(format!(
        "Stitch dimension {missing} is not one of the results dimensions"
      )));
    }

    if self.batch_dimensions.is_empty() {
      return Ok(());
    }

    if self.stitch_dimensions.is_empty() {
      return Err(DownloadError::config("Batch dimensions require at least one stitch dimension"));
    }

    if self.policy == PolicyKind::NearestTime && self.stitch_dimensions.len() != 2 {
      return Err(DownloadError::config(format!(
        "nearest-time enrichment needs exactly two stitch dimensions (user id, time offset), found {}",
        self.stitch_dimensions.len()
      )));
    }

    Ok(())
  }
}
