//! Git adapter: the repository contract over the `git` CLI
//!
//! Every operation spawns `git` with the repository path as working
//! directory and parses the captured output. The environment is isolated so
//! user configuration cannot change the output grammars this adapter relies
//! on. Storage, DAG computation and merge machinery stay inside git; this
//! adapter only queries and parses.

mod parse;

use crate::cache::ObjectCache;
use crate::encoding::Encoding;
use crate::error::{RepoError, RepoResult, ResultExt};
use crate::path::normalize;
use crate::repo::VcsRepo;
use crate::types::{
  BlameLine, CommitLogEntry, EntryKind, LogOptions, LsOptions, MergeFilter, RevRange, Revision,
  TreeEntry,
};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use tracing::{debug, trace};

const LOG_FORMAT: &str = "--pretty=format:%H%n%P%n%ai%n%an <%ae>%n%B";

/// Read-only git repository handle.
pub struct GitRepo {
  path: PathBuf,
  encoding: Encoding,
  attribution: OnceLock<ObjectCache>,
}

impl GitRepo {
  /// Open a git repository with the default encoding.
  pub fn open(path: &Path) -> RepoResult<Self> {
    Self::open_with_encoding(path, Encoding::default())
  }

  /// Open a git repository with an explicit byte encoding.
  pub fn open_with_encoding(path: &Path, encoding: Encoding) -> RepoResult<Self> {
    if !Self::matches_signature(path) {
      return Err(RepoError::UnknownVcsType { path: path.to_path_buf() });
    }
    Ok(GitRepo { path: path.to_path_buf(), encoding, attribution: OnceLock::new() })
  }

  /// True if `path` carries git's on-disk signature, bare or not.
  pub fn matches_signature(path: &Path) -> bool {
    path.join(".git").exists()
      || (path.join("HEAD").is_file() && path.join("objects").is_dir() && path.join("refs").is_dir())
  }

  /// Create a git command with an isolated environment.
  ///
  /// Clears the environment down to `PATH` and `HOME` and forces
  /// `core.quotePath=false` so non-ASCII paths come back as raw bytes
  /// instead of escaped octal.
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(&self.path);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false");
    cmd
  }

  fn render(&self, args: &[OsString]) -> String {
    let mut rendered = String::from("git");
    for arg in args {
      rendered.push(' ');
      rendered.push_str(&arg.to_string_lossy());
    }
    rendered
  }

  /// Run git, requiring exit status 0; returns raw stdout bytes.
  fn run(&self, args: &[OsString]) -> RepoResult<Vec<u8>> {
    let output = self.run_unchecked(args)?;
    if !output.status.success() {
      let stderr = self.encoding.decode(&output.stderr);
      return Err(RepoError::command_failed(self.render(args), stderr));
    }
    Ok(output.stdout)
  }

  /// Run git and hand back the full output; callers interpret the status.
  fn run_unchecked(&self, args: &[OsString]) -> RepoResult<Output> {
    debug!(command = %self.render(args), "invoking git");
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("failed to execute {}", self.render(args)))?;
    trace!(stdout = output.stdout.len(), stderr = output.stderr.len(), "git finished");
    Ok(output)
  }

  fn private_path(&self) -> PathBuf {
    self.path.join(".private")
  }

  fn attribution(&self) -> RepoResult<&ObjectCache> {
    if let Some(cache) = self.attribution.get() {
      return Ok(cache);
    }
    let cache = ObjectCache::open(&self.private_path())?;
    Ok(self.attribution.get_or_init(|| cache))
  }

  /// `rev:path` object spec in the repository encoding.
  fn blob_spec(&self, rev: &str, path: &str) -> OsString {
    self.encoding.encode_arg(&format!("{}:{}", rev, path))
  }

  fn read_blob(&self, rev: &str, path: &str) -> RepoResult<Vec<u8>> {
    let args = vec![os("cat-file"), os("blob"), self.blob_spec(rev, path)];
    self.run(&args)
  }

  fn read_blob_text(&self, rev: &str, path: &str) -> RepoResult<String> {
    Ok(self.encoding.decode(&self.read_blob(rev, path)?))
  }

  /// Which commit introduced the content at `path`, memoized by object id.
  fn attribute_object(&self, rev: &str, path: &str, object: &str) -> RepoResult<Revision> {
    let cache = self.attribution()?;
    if let Some(hit) = cache.get(object)? {
      return Ok(hit);
    }
    let args = vec![
      os("log"),
      os("--pretty=format:%H"),
      os("-1"),
      os(rev),
      os("--"),
      self.encoding.encode_arg(path),
    ];
    let commit = self.encoding.decode(&self.run(&args)?).trim().to_string();
    cache.put(object, &commit)?;
    Ok(commit)
  }

  /// The single-entry description of `path`, used to validate file kind.
  fn describe(&self, rev: &str, path: &str) -> RepoResult<TreeEntry> {
    let opts = LsOptions { directory: true, ..Default::default() };
    let mut listing = self.ls(rev, path, &opts)?;
    match listing.len() {
      1 => Ok(listing.remove(0)),
      n => panic!("expected a single entry for {}, got {}", path, n),
    }
  }

  fn entry_from_record(record: &parse::LogRecord<'_>) -> CommitLogEntry {
    CommitLogEntry {
      rev: record.rev.to_string(),
      parents: record.parents.iter().map(|p| p.to_string()).collect(),
      date: crate::date::parse_isodate(record.date).fixed_or_utc(),
      author: record.author.to_string(),
      message: record.message.to_string(),
    }
  }
}

fn os(arg: &str) -> OsString {
  OsStr::new(arg).to_os_string()
}

impl VcsRepo for GitRepo {
  fn path(&self) -> &Path {
    &self.path
  }

  fn encoding(&self) -> Encoding {
    self.encoding
  }

  fn ls(&self, rev: &str, path: &str, opts: &LsOptions) -> RepoResult<Vec<TreeEntry>> {
    let mut path = normalize(path);
    let mut forcedir = false;
    if opts.directory && path.ends_with('/') {
      forcedir = true;
      while path.ends_with('/') {
        path.pop();
      }
    }
    // length of the query prefix to strip from entry names; fixed before the
    // probe may append a separator
    let ltrim = path.len();

    if path.is_empty() {
      if opts.directory {
        return Ok(vec![TreeEntry::new(EntryKind::Directory, "")]);
      }
    } else {
      // make sure the path exists
      let args = vec![os("ls-tree"), os("-z"), os(rev), os("--"), self.encoding.encode_arg(&path)];
      let output = self.encoding.decode(&self.run(&args)?);
      let output = output.trim_end_matches('\0');
      let first = output.split('\0').next().unwrap_or("");
      let Some(probe) = parse::ls_tree_line(first) else {
        return Err(RepoError::PathDoesNotExist { rev: rev.to_string(), path });
      };
      if probe.is_tree {
        if !(opts.directory || path.ends_with('/')) {
          path.push('/');
        }
      } else if forcedir {
        return Err(RepoError::PathDoesNotExist { rev: rev.to_string(), path });
      }
    }

    let mut args = vec![os("ls-tree"), os("-z")];
    if opts.recursive {
      args.push(os("-r"));
      if opts.recursive_dirs {
        args.push(os("-t"));
      }
    }
    if opts.report.size {
      args.push(os("-l"));
    }
    args.push(os(rev));
    if !path.is_empty() {
      args.push(os("--"));
      args.push(self.encoding.encode_arg(&path));
    }
    let output = self.encoding.decode(&self.run(&args)?);
    let output = output.trim_end_matches('\0');

    let cache_wanted = opts.report.commit;
    let mut results = Vec::new();
    for record in output.split('\0').filter(|r| !r.is_empty()) {
      let line = parse::ls_tree_line(record)
        .unwrap_or_else(|| panic!("unexpected ls-tree output: {}", record));
      // under -t the listing repeats the queried directory itself
      if opts.recursive_dirs && path == format!("{}/", line.name) {
        continue;
      }
      if !line.name.starts_with(path.as_str()) {
        panic!("unexpected ls-tree output: {}", record);
      }

      let kind = if line.is_dir() {
        EntryKind::Directory
      } else if forcedir {
        continue;
      } else if line.is_file() {
        EntryKind::File
      } else if line.is_symlink() {
        EntryKind::Symlink
      } else {
        panic!("unexpected ls-tree output: {}", record);
      };

      let mut entry = TreeEntry::new(kind, line.name.clone());
      let entry_name = line.name[ltrim..].trim_start_matches('/');
      if !entry_name.is_empty() {
        entry.name = Some(entry_name.to_string());
      }
      if kind == EntryKind::File {
        if opts.report.executable {
          entry.executable = Some(line.is_executable());
        }
        if opts.report.size {
          entry.size =
            Some(line.size.unwrap_or_else(|| panic!("unexpected ls-tree output: {}", record)));
        }
      }
      if kind == EntryKind::Symlink && opts.report.target {
        entry.target = Some(self.read_blob_text(rev, &line.name)?);
      }
      if cache_wanted {
        entry.commit = Some(self.attribute_object(rev, &line.name, &line.object)?);
      }
      results.push(entry);
    }
    Ok(results)
  }

  fn cat(&self, rev: &str, path: &str) -> RepoResult<Vec<u8>> {
    let path = normalize(path);
    let entry = self.describe(rev, &path)?;
    if entry.kind != EntryKind::File {
      return Err(RepoError::BadFileType { rev: rev.to_string(), path });
    }
    self.read_blob(rev, &path)
  }

  fn readlink(&self, rev: &str, path: &str) -> RepoResult<String> {
    let path = normalize(path);
    let entry = self.describe(rev, &path)?;
    if entry.kind != EntryKind::Symlink {
      return Err(RepoError::BadFileType { rev: rev.to_string(), path });
    }
    self.read_blob_text(rev, &path)
  }

  fn branches(&self) -> RepoResult<Vec<String>> {
    let output = self.encoding.decode(&self.run(&[os("branch")])?);
    let mut results = Vec::new();
    for line in output.lines().filter(|l| !l.is_empty()) {
      let name = parse::branch_line(line)
        .unwrap_or_else(|| panic!("unexpected branch output: {}", line));
      results.push(name.to_string());
    }
    Ok(results)
  }

  fn tags(&self) -> RepoResult<Vec<String>> {
    let output = self.encoding.decode(&self.run(&[os("tag")])?);
    Ok(output.lines().filter(|l| !l.is_empty()).map(str::to_string).collect())
  }

  fn heads(&self) -> RepoResult<Vec<String>> {
    let mut heads = self.branches()?;
    heads.extend(self.tags()?);
    Ok(heads)
  }

  fn is_empty(&self) -> RepoResult<bool> {
    // nonzero exit just means HEAD resolves to nothing
    let output = self.run_unchecked(&[os("rev-parse"), os("HEAD")])?;
    let stdout = self.encoding.decode(&output.stdout);
    Ok(!parse::is_full_rev(stdout.trim_end()))
  }

  fn contains(&self, rev: &str) -> RepoResult<bool> {
    let output = self.run_unchecked(&[os("rev-list"), os("-n"), os("1"), os(rev)])?;
    Ok(output.status.success())
  }

  fn size(&self) -> RepoResult<usize> {
    let output = self.encoding.decode(&self.run(&[os("rev-list"), os("--all")])?);
    Ok(output.lines().filter(|l| !l.is_empty()).count())
  }

  fn log(&self, opts: &LogOptions) -> RepoResult<Vec<CommitLogEntry>> {
    if self.is_empty()? {
      return Ok(Vec::new());
    }

    let mut args = vec![os("log"), os("-z"), os(LOG_FORMAT)];
    if let Some(limit) = opts.limit {
      args.push(os(&format!("-{}", limit)));
    }
    if opts.first_parent {
      args.push(os("--first-parent"));
    }
    match opts.merges {
      MergeFilter::Only => args.push(os("--merges")),
      MergeFilter::Exclude => args.push(os("--no-merges")),
      MergeFilter::Any => {}
    }
    match &opts.range {
      RevRange::All | RevRange::Between { from: None, to: None } => args.push(os("--all")),
      RevRange::Between { from: None, to: Some(to) } => args.push(os(to)),
      RevRange::Between { from: Some(from), to: None } => {
        // everything reachable from any head but not from `from`
        args.push(os(&format!("^{}", from)));
        args.push(os("--all"));
      }
      RevRange::Between { from: Some(from), to: Some(to) } => {
        args.push(os(&format!("{}..{}", from, to)));
      }
    }
    if let Some(path) = &opts.path {
      if opts.follow {
        args.push(os("--follow"));
      }
      args.push(os("--"));
      args.push(self.encoding.encode_arg(&normalize(path)));
    }

    let output = self.encoding.decode(&self.run(&args)?);
    let mut results = Vec::new();
    for record in output.split('\0').filter(|r| !r.is_empty()) {
      let rec = parse::log_record(record)
        .unwrap_or_else(|| panic!("unexpected log output: {}", record));
      results.push(Self::entry_from_record(&rec));
    }
    Ok(results)
  }

  fn log_entry(&self, rev: &str) -> RepoResult<CommitLogEntry> {
    let args = vec![os("log"), os("-z"), os(LOG_FORMAT), os("-1"), os(rev)];
    let output = self.encoding.decode(&self.run(&args)?);
    let record = output.trim_end_matches('\0');
    let rec = parse::log_record(record)
      .unwrap_or_else(|| panic!("unexpected log output: {}", record));
    Ok(Self::entry_from_record(&rec))
  }

  fn pdiff(&self, rev: &str) -> RepoResult<String> {
    let args = vec![os("diff-tree"), os("-p"), os("-m"), os("--root"), os(rev)];
    Ok(self.encoding.decode(&self.run(&args)?))
  }

  fn diff(&self, rev_a: &str, rev_b: &str, path: Option<&str>) -> RepoResult<String> {
    let mut args = vec![os("diff"), os(rev_a), os(rev_b)];
    if let Some(path) = path {
      args.push(os("--"));
      args.push(self.encoding.encode_arg(&normalize(path)));
    }
    Ok(self.encoding.decode(&self.run(&args)?))
  }

  fn ancestor(&self, rev1: &str, rev2: &str) -> RepoResult<Option<Revision>> {
    let args = vec![os("merge-base"), os(rev1), os(rev2)];
    let output = self.run_unchecked(&args)?;
    match output.status.code() {
      Some(0) => Ok(Some(self.encoding.decode(&output.stdout).trim_end().to_string())),
      // defined outcome: the two revisions share no history
      Some(1) => Ok(None),
      _ => Err(RepoError::command_failed(self.render(&args), self.encoding.decode(&output.stderr))),
    }
  }

  fn blame(&self, rev: &str, path: &str) -> RepoResult<Vec<BlameLine>> {
    let path = normalize(path);
    let entry = self.describe(rev, &path)?;
    if entry.kind != EntryKind::File {
      return Err(RepoError::BadFileType { rev: rev.to_string(), path });
    }
    let args = vec![
      os("blame"),
      os("--root"),
      os("-lc"),
      os(rev),
      os("--"),
      self.encoding.encode_arg(&path),
    ];
    let output = self.encoding.decode(&self.run(&args)?);
    let mut results = Vec::new();
    for line in output.lines() {
      let parts =
        parse::blame_line(line).unwrap_or_else(|| panic!("unexpected blame output: {}", line));
      results.push(BlameLine {
        rev: parts.rev.to_string(),
        author: parts.author.to_string(),
        date: crate::date::parse_isodate(parts.date).fixed_or_utc(),
        line: parts.text.to_string(),
      });
    }
    Ok(results)
  }
}
