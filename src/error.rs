//! Error types for repolens with contextual messages
//!
//! One unified error type covers the whole contract: the two domain errors a
//! path-resolving operation may raise, the discovery failure, and the generic
//! subprocess failure that everything else collapses into. Engine output that
//! does not match its expected grammar is *not* represented here; that is an
//! adapter/engine contract violation and panics at the parse site.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for repolens
#[derive(Debug)]
pub enum RepoError {
  /// The path has no object at the given revision
  PathDoesNotExist { rev: String, path: String },

  /// The path exists at the revision but is not the required kind
  BadFileType { rev: String, path: String },

  /// Repository discovery found no supported engine signature
  UnknownVcsType { path: PathBuf },

  /// An engine subprocess exited nonzero with no defined meaning
  CommandFailed { command: String, stderr: String },

  /// I/O error spawning a subprocess or probing the filesystem
  Io(io::Error),

  /// Generic error with message and optional context
  Message { message: String, context: Option<String> },
}

impl RepoError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RepoError::Message { message: msg.into(), context: None }
  }

  /// Build the failure for a nonzero engine exit
  pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
    RepoError::CommandFailed { command: command.into(), stderr: stderr.into() }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RepoError::Message { message, context } => RepoError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
      },
      other => other,
    }
  }

  /// True for the two domain errors raised by path-resolving operations
  pub fn is_path_error(&self) -> bool {
    matches!(
      self,
      RepoError::PathDoesNotExist { .. } | RepoError::BadFileType { .. }
    )
  }
}

impl fmt::Display for RepoError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RepoError::PathDoesNotExist { rev, path } => {
        write!(f, "path does not exist at {}: {}", rev, path)
      }
      RepoError::BadFileType { rev, path } => {
        write!(f, "wrong file type at {}: {}", rev, path)
      }
      RepoError::UnknownVcsType { path } => {
        write!(f, "no supported version-control signature at: {}", path.display())
      }
      RepoError::CommandFailed { command, stderr } => {
        write!(f, "command failed: {}\n{}", command, stderr)
      }
      RepoError::Io(e) => write!(f, "I/O error: {}", e),
      RepoError::Message { message, context } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RepoError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RepoError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RepoError {
  fn from(err: io::Error) -> Self {
    RepoError::Io(err)
  }
}

impl From<sled::Error> for RepoError {
  fn from(err: sled::Error) -> Self {
    RepoError::message(format!("attribution cache error: {}", err))
  }
}

/// Result type alias for repolens
pub type RepoResult<T> = Result<T, RepoError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RepoResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RepoResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RepoError>,
{
  fn context(self, ctx: impl Into<String>) -> RepoResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RepoResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}
