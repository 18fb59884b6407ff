//! Uniform read-only queries over version-control repositories
//!
//! One polymorphic contract ([`VcsRepo`]) covers tree listing, file and
//! symlink content, branch/tag/head enumeration, commit-log traversal,
//! diffs, common-ancestor lookup, and line attribution. Concrete adapters
//! implement it by invoking the engine's own CLI as a subprocess and parsing
//! its output into typed results; the engine stays the source of truth for
//! storage and history computation. The git adapter is provided.
//!
//! ```no_run
//! use repolens::{LogOptions, LsOptions, VcsRepo};
//!
//! let repo = repolens::open(std::path::Path::new("/srv/repos/project"))?;
//! let entries = repo.ls("HEAD", "/", &LsOptions::default())?;
//! let history = repo.log(&LogOptions::default())?;
//! # Ok::<(), repolens::RepoError>(())
//! ```

pub mod cache;
pub mod date;
pub mod encoding;
pub mod error;
pub mod git;
pub mod path;
pub mod repo;
pub mod types;

pub use cache::{CachedLog, LogCache, ObjectCache};
pub use date::{parse_isodate, VcsDate};
pub use encoding::Encoding;
pub use error::{RepoError, RepoResult, ResultExt};
pub use git::GitRepo;
pub use path::normalize;
pub use repo::{open, open_with_encoding, VcsRepo};
pub use types::{
  BlameLine, CommitLogEntry, EntryKind, LogOptions, LsOptions, MergeFilter, Report, RevRange,
  Revision, TreeEntry,
};
