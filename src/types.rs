//! Typed results and query options for the repository contract

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Opaque identifier naming a point in a repository's history.
///
/// Revisions are compared by exact value as returned by the engine; this
/// layer never normalizes, abbreviates, or orders them itself.
pub type Revision = String;

/// Kind of a tree node at a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
  File,
  Directory,
  Symlink,
}

/// One filesystem-like node in a tree listing.
///
/// `size`, `target`, `executable` and `commit` are populated only when asked
/// for via [`Report`], since each may cost the adapter extra work.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
  pub kind: EntryKind,
  /// Repository-relative path, normalized, no leading separator
  pub path: String,
  /// Path relative to the queried directory; absent only in the
  /// single-entry "describe this path as a directory" case
  pub name: Option<String>,
  /// File size in bytes (files only)
  pub size: Option<u64>,
  /// Link target (symlinks only)
  pub target: Option<String>,
  /// Whether the file mode has the owner-execute bit (files only)
  pub executable: Option<bool>,
  /// Revision that introduced this object's content
  pub commit: Option<Revision>,
}

impl TreeEntry {
  pub(crate) fn new(kind: EntryKind, path: impl Into<String>) -> Self {
    TreeEntry {
      kind,
      path: path.into(),
      name: None,
      size: None,
      target: None,
      executable: None,
      commit: None,
    }
  }
}

/// Extra per-entry attributes to compute during a tree listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Report {
  pub size: bool,
  pub target: bool,
  pub executable: bool,
  pub commit: bool,
}

/// Options for [`VcsRepo::ls`](crate::VcsRepo::ls).
#[derive(Debug, Clone, Copy, Default)]
pub struct LsOptions {
  /// Recursively list files in subdirectories
  pub recursive: bool,
  /// With `recursive`, also list the directories themselves
  pub recursive_dirs: bool,
  /// Describe the path itself instead of its contents
  pub directory: bool,
  /// Extra attributes to compute
  pub report: Report,
}

/// One commit as recorded by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitLogEntry {
  pub rev: Revision,
  /// Recorded parentage, in engine order; empty for roots, two or more
  /// for merges. Never inferred or collapsed by this layer.
  pub parents: Vec<Revision>,
  pub date: DateTime<FixedOffset>,
  /// Free-text identity, typically `name <email>`
  pub author: String,
  /// Raw multi-line commit message
  pub message: String,
}

impl CommitLogEntry {
  /// The message up to the first line break, without trailing whitespace.
  pub fn subject(&self) -> &str {
    self.message.split('\n').next().unwrap_or("").trim_end()
  }
}

/// One attributed line of a file, in file order.
#[derive(Debug, Clone, Serialize)]
pub struct BlameLine {
  pub rev: Revision,
  pub author: String,
  pub date: DateTime<FixedOffset>,
  /// Raw line content, without the trailing newline
  pub line: String,
}

/// Which commits a log traversal visits.
///
/// Traversal for `Between` walks `to` and its ancestors, stopping at and
/// excluding `from` and `from`'s ancestors. An absent `from` means the
/// beginning of history; an absent `to` means everything reachable from any
/// head.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RevRange {
  /// All history reachable from all heads, reverse-chronological
  #[default]
  All,
  Between {
    from: Option<Revision>,
    to: Option<Revision>,
  },
}

/// Merge-commit filtering for log traversals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MergeFilter {
  /// Merges and non-merges alike
  #[default]
  Any,
  /// Only commits with two or more parents
  Only,
  /// Only commits with fewer than two parents
  Exclude,
}

/// Options for [`VcsRepo::log`](crate::VcsRepo::log).
///
/// Hashable so a query can key a memoization slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LogOptions {
  pub range: RevRange,
  /// Keep at most this many entries
  pub limit: Option<usize>,
  /// Follow only the first parent of each merge
  pub first_parent: bool,
  pub merges: MergeFilter,
  /// Only commits touching this path
  pub path: Option<String>,
  /// With `path`, keep following the file across renames
  pub follow: bool,
}
