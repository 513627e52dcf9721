//! Lookup path for `<name>` style expression references.

use std::path::PathBuf;

/// One `-I` / `SYSP_PATH` entry: either `prefix=path` or a bare directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPathEntry {
  pub prefix: Option<String>,
  pub path: PathBuf,
}

impl SearchPathEntry {
  pub fn parse(entry: &str) -> Self {
    match entry.split_once('=') {
      Some((prefix, path)) => Self {
        prefix: Some(prefix.to_string()),
        path: PathBuf::from(path),
      },
      None => Self {
        prefix: None,
        path: PathBuf::from(entry),
      },
    }
  }

  fn candidate(&self, name: &str) -> Option<PathBuf> {
    match &self.prefix {
      None => Some(self.path.join(name)),
      Some(prefix) if name == prefix => Some(self.path.clone()),
      Some(prefix) => name
        .strip_prefix(prefix.as_str())
        .and_then(|rest| rest.strip_prefix('/'))
        .map(|rest| self.path.join(rest)),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
  entries: Vec<SearchPathEntry>,
}

impl SearchPath {
  pub fn new(entries: Vec<SearchPathEntry>) -> Self {
    Self { entries }
  }

  /// Build from `-I` flags followed by the colon-separated `env` value.
  pub fn parse(flags: &[String], env: Option<&str>) -> Self {
    let entries = flags
      .iter()
      .map(String::as_str)
      .chain(env.into_iter().flat_map(|value| value.split(':')))
      .filter(|entry| !entry.is_empty())
      .map(SearchPathEntry::parse)
      .collect();
    Self { entries }
  }

  pub fn entries(&self) -> &[SearchPathEntry] {
    &self.entries
  }

  /// Resolve `name` (e.g. `pkgs` or `pkgs/lib/util.lua`) to the first existing match.
  pub fn find_file(&self, name: &str) -> Option<PathBuf> {
    self
      .entries
      .iter()
      .filter_map(|entry| entry.candidate(name))
      .find(|candidate| candidate.exists())
  }
}
