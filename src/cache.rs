//! Attribution cache and log memoization
//!
//! Two caches live here. [`ObjectCache`] is the persistent object-id →
//! revision map backing the expensive "which commit introduced this content"
//! lookup; it lives in an adapter-private directory under the repository.
//! [`LogCache`] is an in-memory, caller-owned LRU over exact log queries,
//! with an observable served-from-cache flag.

use crate::error::RepoResult;
use crate::repo::VcsRepo;
use crate::types::{CommitLogEntry, LogOptions, Revision};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

/// Persistent map from content-object identifier to attributing revision.
///
/// Object identifiers are content-addressed, so an entry can never go stale
/// and is never invalidated. Concurrent writers racing on the same key write
/// the same value; last-write-wins is correct.
pub struct ObjectCache {
  db: sled::Db,
}

impl ObjectCache {
  /// Open (creating if needed) the cache store under `private_dir`.
  pub fn open(private_dir: &Path) -> RepoResult<Self> {
    std::fs::create_dir_all(private_dir)?;
    let db = sled::open(private_dir.join("object-cache.db"))?;
    Ok(ObjectCache { db })
  }

  /// The revision recorded for `object_id`, if any.
  pub fn get(&self, object_id: &str) -> RepoResult<Option<Revision>> {
    let value = self.db.get(object_id.as_bytes())?;
    Ok(value.map(|v| String::from_utf8_lossy(&v).into_owned()))
  }

  /// Record the attributing revision for `object_id`.
  pub fn put(&self, object_id: &str, rev: &str) -> RepoResult<()> {
    self.db.insert(object_id.as_bytes(), rev.as_bytes())?;
    self.db.flush()?;
    Ok(())
  }
}

/// A log result plus whether it was served from the cache.
#[derive(Debug, Clone)]
pub struct CachedLog {
  pub entries: Arc<Vec<CommitLogEntry>>,
  pub cached: bool,
}

/// Bounded memoization of log queries, keyed by the exact [`LogOptions`].
///
/// Owned by the caller, not by the repository: results stay immutable and
/// repeated identical queries within a session are answered without another
/// engine invocation.
pub struct LogCache {
  entries: LruCache<LogOptions, Arc<Vec<CommitLogEntry>>>,
}

impl LogCache {
  const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(32).unwrap();

  pub fn new(capacity: NonZeroUsize) -> Self {
    LogCache { entries: LruCache::new(capacity) }
  }

  /// Run `opts` against `repo`, reusing a previous identical query's result.
  pub fn log(&mut self, repo: &dyn VcsRepo, opts: &LogOptions) -> RepoResult<CachedLog> {
    if let Some(hit) = self.entries.get(opts) {
      return Ok(CachedLog { entries: Arc::clone(hit), cached: true });
    }
    let fresh = Arc::new(repo.log(opts)?);
    self.entries.put(opts.clone(), Arc::clone(&fresh));
    Ok(CachedLog { entries: fresh, cached: false })
  }
}

impl Default for LogCache {
  fn default() -> Self {
    LogCache::new(Self::DEFAULT_CAPACITY)
  }
}
