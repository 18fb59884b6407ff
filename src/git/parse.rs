//! Line grammars for captured git output
//!
//! Pure parsers over decoded text. Each returns `None` for input outside its
//! grammar; the adapter treats that as an engine-contract violation and
//! panics at the call site with the offending line.

use regex::Regex;
use std::sync::LazyLock;

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;
const S_IFLNK: u32 = 0o120000;
const S_IXUSR: u32 = 0o100;

static LS_TREE_RX: LazyLock<Regex> = LazyLock::new(|| {
  // names may contain newlines under -z, hence (?s)
  Regex::new(r"(?si)^(?P<mode>[0-7]{6}) (?P<kind>tree|blob) (?P<object>[0-9a-f]{40})(?: +(?P<size>\d+|-))?\t(?P<name>.+)$")
    .expect("static regex")
});

static BRANCH_RX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\*?\s+(?P<name>.+)$").expect("static regex"));

static REV_RX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{40}$").expect("static regex"));

static BLAME_RX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?P<rev>[0-9a-fA-F]{40})\t\((?P<author>[^\t]*)\t(?P<date>[^\t]+)\t\d+\)(?P<text>.*)$")
    .expect("static regex")
});

/// One record of `git ls-tree -z [-l]` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsTreeLine {
  /// Mode bits, parsed from the octal field
  pub mode: u32,
  /// The object-kind tag, `tree` or `blob`
  pub is_tree: bool,
  /// Content-object identifier (40 hex digits)
  pub object: String,
  /// Blob size under `-l`; `None` for trees or when `-l` was not given
  pub size: Option<u64>,
  /// Repository-relative entry path
  pub name: String,
}

impl LsTreeLine {
  pub fn is_dir(&self) -> bool {
    self.mode & S_IFMT == S_IFDIR
  }

  pub fn is_file(&self) -> bool {
    self.mode & S_IFMT == S_IFREG
  }

  pub fn is_symlink(&self) -> bool {
    self.mode & S_IFMT == S_IFLNK
  }

  pub fn is_executable(&self) -> bool {
    self.mode & S_IXUSR != 0
  }
}

/// Parse one NUL-separated `ls-tree` record.
pub fn ls_tree_line(record: &str) -> Option<LsTreeLine> {
  let caps = LS_TREE_RX.captures(record)?;
  let mode = u32::from_str_radix(&caps["mode"], 8).ok()?;
  let size = caps.name("size").and_then(|m| m.as_str().parse::<u64>().ok());
  Some(LsTreeLine {
    mode,
    is_tree: caps["kind"].eq_ignore_ascii_case("tree"),
    object: caps["object"].to_ascii_lowercase(),
    size,
    name: caps["name"].to_string(),
  })
}

/// Parse one line of `git branch` output, tolerating the `*` current marker.
pub fn branch_line(line: &str) -> Option<&str> {
  BRANCH_RX.captures(line).and_then(|caps| caps.name("name")).map(|m| m.as_str())
}

/// True if `text` is a full 40-hex revision identifier.
pub fn is_full_rev(text: &str) -> bool {
  REV_RX.is_match(text)
}

/// One line of `git blame --root -lc` output, fields still textual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameParts<'a> {
  pub rev: &'a str,
  pub author: &'a str,
  pub date: &'a str,
  pub text: &'a str,
}

/// Parse one blame line: `rev TAB ( author TAB date TAB lineno ) text`.
pub fn blame_line(line: &str) -> Option<BlameParts<'_>> {
  let caps = BLAME_RX.captures(line)?;
  Some(BlameParts {
    rev: caps.name("rev")?.as_str(),
    author: caps.name("author")?.as_str(),
    date: caps.name("date")?.as_str(),
    text: caps.name("text")?.as_str(),
  })
}

/// Fields of one NUL-separated log record emitted with
/// `--pretty=format:%H%n%P%n%ai%n%an <%ae>%n%B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord<'a> {
  pub rev: &'a str,
  pub parents: Vec<&'a str>,
  pub date: &'a str,
  pub author: &'a str,
  pub message: &'a str,
}

/// Split one log record into its five newline-separated fields.
pub fn log_record(record: &str) -> Option<LogRecord<'_>> {
  let mut fields = record.splitn(5, '\n');
  let rev = fields.next()?;
  let parents = fields.next()?;
  let date = fields.next()?;
  let author = fields.next()?;
  let message = fields.next()?;
  Some(LogRecord {
    rev,
    parents: parents.split_whitespace().collect(),
    date,
    author,
    message,
  })
}
