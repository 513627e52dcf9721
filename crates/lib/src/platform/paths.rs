use std::env;
use std::path::PathBuf;

use crate::consts::{APP_NAME, PROFILE_ENV};

/// Value of `var` as a path, ignoring unset and empty values.
fn env_path(var: &str) -> Option<PathBuf> {
  env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(windows)]
fn data_home() -> Option<PathBuf> {
  env_path("APPDATA")
}

#[cfg(not(windows))]
fn data_home() -> Option<PathBuf> {
  env_path("XDG_DATA_HOME").or_else(|| env_path("HOME").map(|home| home.join(".local").join("share")))
}

/// Per-user data directory of the application.
///
/// Without any usable home variable this degrades to a dot directory under
/// the working directory rather than failing.
pub fn data_dir() -> PathBuf {
  match data_home() {
    Some(base) => base.join(APP_NAME),
    None => PathBuf::from(format!(".{APP_NAME}")),
  }
}

/// Root directory of the default local store (`<root>/store`, `<root>/var`).
pub fn default_store_root() -> PathBuf {
  data_dir()
}

pub fn profiles_dir() -> PathBuf {
  data_dir().join("profiles")
}

/// Profile used when a command gets no explicit `--profile`.
pub fn default_profile() -> PathBuf {
  env_path(PROFILE_ENV).unwrap_or_else(|| profiles_dir().join("default"))
}
