//! Tree listing behavior of the git adapter

#![cfg(unix)]

use crate::helpers::GitFixture;
use anyhow::Result;
use repolens::{EntryKind, LsOptions, RepoError, Report, TreeEntry, VcsRepo};

fn sorted_names(mut entries: Vec<TreeEntry>) -> Vec<(String, EntryKind)> {
  entries.sort_by(|a, b| a.path.cmp(&b.path));
  entries.into_iter().map(|e| (e.name.unwrap_or_default(), e.kind)).collect()
}

#[test]
fn root_listing_is_single_level() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let entries = repo.ls("HEAD", "/", &LsOptions::default())?;
  assert_eq!(
    sorted_names(entries),
    vec![
      ("a".to_string(), EntryKind::File),
      ("b".to_string(), EntryKind::Symlink),
      ("c".to_string(), EntryKind::Directory),
    ]
  );
  Ok(())
}

#[test]
fn recursive_listing_without_directories() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let opts = LsOptions { recursive: true, ..Default::default() };
  let entries = repo.ls("HEAD", "", &opts)?;
  assert_eq!(
    sorted_names(entries),
    vec![
      ("a".to_string(), EntryKind::File),
      ("b".to_string(), EntryKind::Symlink),
      ("c/d/e".to_string(), EntryKind::File),
      ("c/d/f".to_string(), EntryKind::Symlink),
    ]
  );
  Ok(())
}

#[test]
fn recursive_listing_with_directories_excludes_query_root() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let opts = LsOptions { recursive: true, recursive_dirs: true, ..Default::default() };
  let entries = repo.ls("HEAD", "/", &opts)?;
  let names: Vec<String> = sorted_names(entries).into_iter().map(|(n, _)| n).collect();
  assert_eq!(names, vec!["a", "b", "c", "c/d", "c/d/e", "c/d/f"]);

  // listing a subdirectory never repeats the subdirectory itself
  let entries = repo.ls("HEAD", "c/", &opts)?;
  let names: Vec<String> = sorted_names(entries).into_iter().map(|(n, _)| n).collect();
  assert_eq!(names, vec!["d", "d/e", "d/f"]);
  Ok(())
}

#[test]
fn subdirectory_listing_prefixes_paths() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let entries = repo.ls("HEAD", "//c//d/", &LsOptions::default())?;
  for entry in &entries {
    let rest = entry.path.strip_prefix("c/d/").expect("entry under query path");
    assert!(!rest.contains('/'), "single level only: {}", entry.path);
  }
  assert_eq!(entries.len(), 2);
  Ok(())
}

#[test]
fn executable_report_only_touches_files() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let opts = LsOptions { report: Report { executable: true, ..Default::default() }, ..Default::default() };
  let mut entries = repo.ls("HEAD", "c/d", &opts)?;
  entries.sort_by(|a, b| a.path.cmp(&b.path));

  let e = &entries[0];
  assert_eq!(e.name.as_deref(), Some("e"));
  assert_eq!(e.executable, Some(true));

  let f = &entries[1];
  assert_eq!(f.name.as_deref(), Some("f"));
  assert_eq!(f.kind, EntryKind::Symlink);
  assert_eq!(f.executable, None);
  Ok(())
}

#[test]
fn size_and_target_reports() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let opts = LsOptions {
    report: Report { size: true, target: true, ..Default::default() },
    ..Default::default()
  };
  let mut entries = repo.ls("HEAD", "", &opts)?;
  entries.sort_by(|a, b| a.path.cmp(&b.path));

  assert_eq!(entries[0].size, Some("Pisgah\n".len() as u64));
  assert_eq!(entries[1].target.as_deref(), Some("a"));
  assert_eq!(entries[2].size, None);
  Ok(())
}

#[test]
fn non_executable_file_reports_false() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let opts = LsOptions { report: Report { executable: true, ..Default::default() }, ..Default::default() };
  let entries = repo.ls("HEAD", "a", &opts)?;
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].executable, Some(false));
  Ok(())
}

#[test]
fn describe_directory_and_root() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let opts = LsOptions { directory: true, ..Default::default() };
  let entries = repo.ls("HEAD", "c", &opts)?;
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].kind, EntryKind::Directory);
  assert_eq!(entries[0].name, None);

  let entries = repo.ls("HEAD", "/", &opts)?;
  assert_eq!(entries.len(), 1);
  assert_eq!(entries[0].kind, EntryKind::Directory);
  Ok(())
}

#[test]
fn missing_paths_and_failed_assertions() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.standard_tree()?;
  let repo = fx.repo()?;

  let err = repo.ls("HEAD", "no/such/path", &LsOptions::default()).unwrap_err();
  assert!(matches!(err, RepoError::PathDoesNotExist { .. }), "got {err}");

  // trailing separator asserts the path is a directory; `a` is a file
  let opts = LsOptions { directory: true, ..Default::default() };
  let err = repo.ls("HEAD", "a/", &opts).unwrap_err();
  assert!(matches!(err, RepoError::PathDoesNotExist { .. }), "got {err}");
  Ok(())
}
