//! Settings read from the environment.
//!
//! Command-line flags override these; see the CLI's global options.

use std::path::PathBuf;

use crate::consts::{SEARCH_PATH_ENV, STORE_ENV};
use crate::eval::SearchPath;
use crate::platform::paths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  /// Store URI (`SYSP_STORE`), `auto` when unset.
  pub store_uri: String,
  /// Root of the `auto`/`local` store.
  pub store_root: PathBuf,
  /// Raw `SYSP_PATH` value.
  pub search_path: Option<String>,
  /// Profile used by `install` (`SYSP_PROFILE`).
  pub default_profile: PathBuf,
}

impl Settings {
  pub fn from_env() -> Self {
    Self {
      store_uri: std::env::var(STORE_ENV)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "auto".to_string()),
      store_root: paths::default_store_root(),
      search_path: std::env::var(SEARCH_PATH_ENV).ok(),
      default_profile: paths::default_profile(),
    }
  }

  /// Search path with `-I` entries ahead of `SYSP_PATH` ones.
  pub fn search_path(&self, include: &[String]) -> SearchPath {
    SearchPath::parse(include, self.search_path.as_deref())
  }
}
