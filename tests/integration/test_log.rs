//! Commit-log traversal, revision ranges, and filters

use crate::helpers::GitFixture;
use anyhow::Result;
use repolens::{LogOptions, MergeFilter, RepoError, RevRange, VcsRepo};

fn linear_history(fx: &GitFixture) -> Result<(String, String, String)> {
  fx.write("a", "one\n")?;
  let c1 = fx.commit_all("one")?;
  fx.write("a", "two\n")?;
  let c2 = fx.commit_all("two")?;
  fx.write("a", "three\n")?;
  let c3 = fx.commit_all("three")?;
  Ok((c1, c2, c3))
}

fn revs(entries: &[repolens::CommitLogEntry]) -> Vec<&str> {
  entries.iter().map(|e| e.rev.as_str()).collect()
}

#[test]
fn full_log_is_reverse_chronological() -> Result<()> {
  let fx = GitFixture::new()?;
  let (c1, c2, c3) = linear_history(&fx)?;
  let repo = fx.repo()?;

  let entries = repo.log(&LogOptions::default())?;
  assert_eq!(revs(&entries), vec![c3.as_str(), c2.as_str(), c1.as_str()]);
  Ok(())
}

#[test]
fn range_excludes_from_and_its_ancestors() -> Result<()> {
  let fx = GitFixture::new()?;
  let (c1, c2, c3) = linear_history(&fx)?;
  let repo = fx.repo()?;

  let opts = LogOptions {
    range: RevRange::Between { from: Some(c1.clone()), to: Some(c3.clone()) },
    ..Default::default()
  };
  assert_eq!(revs(&repo.log(&opts)?), vec![c3.as_str(), c2.as_str()]);
  Ok(())
}

#[test]
fn open_ended_ranges() -> Result<()> {
  let fx = GitFixture::new()?;
  let (c1, c2, c3) = linear_history(&fx)?;
  let repo = fx.repo()?;

  // ancestors of c2, inclusive
  let opts = LogOptions {
    range: RevRange::Between { from: None, to: Some(c2.clone()) },
    ..Default::default()
  };
  assert_eq!(revs(&repo.log(&opts)?), vec![c2.as_str(), c1.as_str()]);

  // everything any head reaches that c1 does not
  let opts = LogOptions {
    range: RevRange::Between { from: Some(c1.clone()), to: None },
    ..Default::default()
  };
  assert_eq!(revs(&repo.log(&opts)?), vec![c3.as_str(), c2.as_str()]);

  // both ends open behaves like the unspecified range
  let opts = LogOptions {
    range: RevRange::Between { from: None, to: None },
    ..Default::default()
  };
  assert_eq!(repo.log(&opts)?.len(), 3);
  Ok(())
}

#[test]
fn limit_truncates_from_the_newest() -> Result<()> {
  let fx = GitFixture::new()?;
  let (_, c2, c3) = linear_history(&fx)?;
  let repo = fx.repo()?;

  let opts = LogOptions { limit: Some(2), ..Default::default() };
  assert_eq!(revs(&repo.log(&opts)?), vec![c3.as_str(), c2.as_str()]);
  Ok(())
}

#[test]
fn single_entry_lookup() -> Result<()> {
  let fx = GitFixture::new()?;
  let (c1, c2, _) = linear_history(&fx)?;
  let repo = fx.repo()?;

  let entry = repo.log_entry(&c2)?;
  assert_eq!(entry.rev, c2);
  assert_eq!(entry.parents, vec![c1.clone()]);
  assert_eq!(entry.subject(), "two");
  assert_eq!(entry.author, "Test User <test@example.com>");

  let root = repo.log_entry(&c1)?;
  assert!(root.parents.is_empty());
  Ok(())
}

#[test]
fn single_entry_on_empty_repository_is_not_found() -> Result<()> {
  let fx = GitFixture::new()?;
  let repo = fx.repo()?;

  let err = repo.log_entry("HEAD").unwrap_err();
  assert!(matches!(err, RepoError::CommandFailed { .. }), "got {err}");
  Ok(())
}

#[test]
fn subject_is_first_message_line() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.write("a", "x\n")?;
  let rev = fx.commit_all("summary line\n\nlonger body\nwith more text")?;
  let repo = fx.repo()?;

  let entry = repo.log_entry(&rev)?;
  assert_eq!(entry.subject(), "summary line");
  assert!(entry.message.contains("longer body"));
  Ok(())
}

#[test]
fn merge_structure_and_filters() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.write("a", "base\n")?;
  let base = fx.commit_all("base")?;
  fx.checkout_new("side")?;
  fx.write("side.txt", "side\n")?;
  let side = fx.commit_all("side work")?;
  fx.checkout("main")?;
  fx.write("main.txt", "main\n")?;
  let main2 = fx.commit_all("main work")?;
  let merge = fx.merge_no_ff("side", "merge side")?;
  let repo = fx.repo()?;

  // recorded parentage, first parent first
  let entry = repo.log_entry(&merge)?;
  assert_eq!(entry.parents, vec![main2.clone(), side.clone()]);

  let only = LogOptions { merges: MergeFilter::Only, ..Default::default() };
  assert_eq!(revs(&repo.log(&only)?), vec![merge.as_str()]);

  let none = LogOptions { merges: MergeFilter::Exclude, ..Default::default() };
  let entries = repo.log(&none)?;
  assert!(entries.iter().all(|e| e.parents.len() < 2));
  assert_eq!(entries.len(), 3);

  // first-parent traversal from the merge skips the side branch
  let first = LogOptions {
    range: RevRange::Between { from: None, to: Some(merge.clone()) },
    first_parent: true,
    ..Default::default()
  };
  assert_eq!(
    revs(&repo.log(&first)?),
    vec![merge.as_str(), main2.as_str(), base.as_str()]
  );
  Ok(())
}

#[test]
fn path_filter_narrows_but_keeps_order() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.write("a", "one\n")?;
  let c1 = fx.commit_all("touch a")?;
  fx.write("b", "one\n")?;
  fx.commit_all("touch b")?;
  fx.write("a", "two\n")?;
  let c3 = fx.commit_all("touch a again")?;
  let repo = fx.repo()?;

  let opts = LogOptions { path: Some("a".to_string()), ..Default::default() };
  assert_eq!(revs(&repo.log(&opts)?), vec![c3.as_str(), c1.as_str()]);

  let opts = LogOptions { path: Some("/nothing/here".to_string()), ..Default::default() };
  assert!(repo.log(&opts)?.is_empty());
  Ok(())
}

#[test]
fn follow_tracks_renames() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.write("old.txt", "content\n")?;
  let c1 = fx.commit_all("create")?;
  fx.rename("old.txt", "new.txt")?;
  let c2 = fx.commit_all("rename")?;
  let repo = fx.repo()?;

  let plain = LogOptions { path: Some("new.txt".to_string()), ..Default::default() };
  assert_eq!(revs(&repo.log(&plain)?), vec![c2.as_str()]);

  let follow = LogOptions { path: Some("new.txt".to_string()), follow: true, ..Default::default() };
  assert_eq!(revs(&repo.log(&follow)?), vec![c2.as_str(), c1.as_str()]);
  Ok(())
}

#[test]
fn dates_carry_the_commit_offset() -> Result<()> {
  let fx = GitFixture::new()?;
  fx.write("a", "x\n")?;
  let rev = fx.commit_all("dated")?;
  let repo = fx.repo()?;

  let entry = repo.log_entry(&rev)?;
  // the %ai date round-trips through the permissive parser
  assert!(entry.date.timestamp() > 0);
  Ok(())
}
