//! An empty store with no filesystem behind it.

use std::path::{Path, PathBuf};

use super::{PathInfo, Store, StoreError, StorePath};

const DUMMY_STORE_DIR: &str = "/sysp/store";

/// Has no valid paths and cannot build or hold profiles.
#[derive(Debug, Clone)]
pub struct DummyStore {
  store_dir: PathBuf,
}

impl DummyStore {
  pub fn new() -> Self {
    Self {
      store_dir: PathBuf::from(DUMMY_STORE_DIR),
    }
  }
}

impl Default for DummyStore {
  fn default() -> Self {
    Self::new()
  }
}

impl Store for DummyStore {
  fn uri(&self) -> String {
    "dummy://".to_string()
  }

  fn store_dir(&self) -> &Path {
    &self.store_dir
  }

  fn is_valid_path(&self, _path: &StorePath) -> Result<bool, StoreError> {
    Ok(false)
  }

  fn query_all_valid_paths(&self) -> Result<Vec<StorePath>, StoreError> {
    Ok(Vec::new())
  }

  fn query_path_info(&self, path: &StorePath) -> Result<PathInfo, StoreError> {
    Err(StoreError::NotValid(self.print_store_path(path)))
  }
}
