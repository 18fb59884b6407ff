//! The polymorphic repository contract and engine discovery

use crate::encoding::Encoding;
use crate::error::{RepoError, RepoResult};
use crate::types::{BlameLine, CommitLogEntry, LogOptions, LsOptions, Revision, TreeEntry};
use std::path::Path;

/// Read-only query surface every engine adapter implements.
///
/// Every operation synchronously invokes zero or more engine subprocesses
/// against the repository path, parses their captured output, and returns
/// typed data. Adapters hold no state beyond the repository path, the
/// configured encoding, and the attribution cache handle, so concurrent
/// calls against the same repository are as safe as the engine's own
/// concurrent-reader guarantees.
pub trait VcsRepo {
  /// The repository's on-disk location.
  fn path(&self) -> &Path;

  /// The byte encoding applied to arguments and captured output.
  fn encoding(&self) -> Encoding;

  /// List a directory or describe a single path at a revision.
  ///
  /// The path may start with a separator or not; a trailing separator on a
  /// directory query asserts the path must resolve to a directory. Entries
  /// come back in no particular order.
  ///
  /// Fails with [`RepoError::PathDoesNotExist`] if the path has no object at
  /// `rev`, or if a trailing-separator assertion is not met.
  fn ls(&self, rev: &str, path: &str, opts: &LsOptions) -> RepoResult<Vec<TreeEntry>>;

  /// Contents of the regular file at `path`, as raw bytes.
  ///
  /// Fails with [`RepoError::PathDoesNotExist`] if missing and
  /// [`RepoError::BadFileType`] if the object is not a regular file.
  fn cat(&self, rev: &str, path: &str) -> RepoResult<Vec<u8>>;

  /// Target of the symbolic link at `path`.
  ///
  /// Same existence contract as [`cat`](Self::cat); fails with
  /// [`RepoError::BadFileType`] if the object is not a symlink.
  fn readlink(&self, rev: &str, path: &str) -> RepoResult<String>;

  /// Branch names.
  fn branches(&self) -> RepoResult<Vec<String>>;

  /// Tag names.
  fn tags(&self) -> RepoResult<Vec<String>>;

  /// Every reference suitable for "give me all that is reachable".
  ///
  /// The exact composition is engine-defined but always a superset of
  /// branches.
  fn heads(&self) -> RepoResult<Vec<String>>;

  /// True if the repository has no commits at all.
  fn is_empty(&self) -> RepoResult<bool>;

  /// True if `rev` resolves to a commit in this repository.
  fn contains(&self, rev: &str) -> RepoResult<bool>;

  /// Number of commits reachable from all heads.
  fn size(&self) -> RepoResult<usize>;

  /// Walk commit history per `opts`, reverse-chronological.
  ///
  /// An empty repository yields an empty list for any range.
  fn log(&self, opts: &LogOptions) -> RepoResult<Vec<CommitLogEntry>>;

  /// The log entry for exactly one revision.
  ///
  /// Unknown revisions (including any lookup against an empty repository)
  /// are a not-found failure, surfaced as [`RepoError::CommandFailed`].
  fn log_entry(&self, rev: &str) -> RepoResult<CommitLogEntry>;

  /// Unified diff between `rev` and its parent(s), prefix-one form.
  ///
  /// Merges diff against each parent combined; a parentless commit diffs
  /// against the empty tree.
  fn pdiff(&self, rev: &str) -> RepoResult<String>;

  /// Unified diff from `rev_a` to `rev_b`, optionally scoped to one path.
  fn diff(&self, rev_a: &str, rev_b: &str, path: Option<&str>) -> RepoResult<String>;

  /// Most recent common ancestor of two revisions, or `None` when the two
  /// share no history at all.
  fn ancestor(&self, rev1: &str, rev2: &str) -> RepoResult<Option<Revision>>;

  /// Line-by-line attribution of the file at `path`, in file order.
  ///
  /// Same existence and file-kind contract as [`cat`](Self::cat).
  fn blame(&self, rev: &str, path: &str) -> RepoResult<Vec<BlameLine>>;
}

/// Open the repository at `path`, picking the adapter by on-disk signature.
///
/// Fails with [`RepoError::UnknownVcsType`] when no supported engine's
/// signature matches.
pub fn open(path: &Path) -> RepoResult<Box<dyn VcsRepo>> {
  open_with_encoding(path, Encoding::default())
}

/// Like [`open`], with an explicit byte encoding for the repository.
pub fn open_with_encoding(path: &Path, encoding: Encoding) -> RepoResult<Box<dyn VcsRepo>> {
  if crate::git::GitRepo::matches_signature(path) {
    let repo = crate::git::GitRepo::open_with_encoding(path, encoding)?;
    return Ok(Box::new(repo));
  }
  Err(RepoError::UnknownVcsType { path: path.to_path_buf() })
}
