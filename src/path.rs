//! Canonicalization of caller-supplied repository paths

use regex::Regex;
use std::sync::LazyLock;

static MULTISLASH_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//+").expect("static regex"));

/// Normalize a caller-supplied path for use against a repository tree.
///
/// Strips all leading separators and collapses runs of consecutive
/// separators into one. A trailing separator is preserved: several call
/// sites rely on it to mean "treat this path as a directory". `.` and `..`
/// components are passed through untouched; the engine resolves them (or
/// rejects them) itself.
pub fn normalize(path: &str) -> String {
  let path = path.trim_start_matches('/');
  MULTISLASH_RX.replace_all(path, "/").into_owned()
}
