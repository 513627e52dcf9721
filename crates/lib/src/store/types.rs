use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::path::{StorePath, StorePathError};
use crate::util::hash::TreeHashError;

/// Registration record of a valid store path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfo {
  pub path: StorePath,
  /// SHA-256 of the object tree (see `util::hash::hash_tree`).
  pub nar_hash: String,
  pub nar_size: u64,
  #[serde(default)]
  pub references: BTreeSet<StorePath>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deriver: Option<StorePath>,
  /// Seconds since the Unix epoch.
  pub registration_time: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error(transparent)]
  InvalidPath(#[from] StorePathError),

  #[error("path '{path}' is not in the store '{store_dir}'")]
  NotInStore { path: String, store_dir: PathBuf },

  #[error("path '{0}' is not valid")]
  NotValid(String),

  #[error("path '{0}' is not valid and cannot be built by this store")]
  CannotBuild(String),

  #[error("don't know how to open store '{0}'")]
  UnsupportedUri(String),

  #[error("store '{0}' does not support local filesystem operations")]
  NotLocal(String),

  #[error("reference cycle between store paths involving '{0}'")]
  ReferenceCycle(String),

  #[error("I/O error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("corrupt registration {path}: {source}")]
  Registration {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to hash store object: {0}")]
  Hash(#[from] TreeHashError),
}

impl StoreError {
  pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.into();
    move |source| StoreError::Io { path, source }
  }
}
