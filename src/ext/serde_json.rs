// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path navigation over serde_json::Value for decoding Reporting API responses
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper (typed extraction, arrays, string lists)
// invariants: No panics; missing paths yield None or empty collections
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

/// A located (or missing) JSON value, extracted in a second step.
pub struct JsonFetched<'a> {
  inner: Option<&'a serde_json::Value>,
}

impl<'a> JsonFetched<'a> {
  pub fn to<T>(&self) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.inner.and_then(|v| serde_json::from_value::<T>(v.clone()).ok())
  }

  /// Elements of an array value; empty when missing or not an array.
  pub fn items(&self) -> &'a [serde_json::Value] {
    self.inner.and_then(|v| v.as_array()).map(Vec::as_slice).unwrap_or(&[])
  }

  /// String elements of an array value; non-string elements are skipped.
  pub fn strings(&self) -> Vec<String> {
    self
      .items()
      .iter()
      .filter_map(|v| v.as_str().map(str::to_string))
      .collect()
  }
}

/// Fetch nested values via dotted paths like "columnHeader.dimensions".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for serde_json::Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
