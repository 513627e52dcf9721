//! Test fixtures for sysp-lib.

use std::collections::BTreeSet;

use tempfile::TempDir;

use crate::store::{LocalFsStore, LocalStore, StorePath};

/// A local store in a temporary directory.
pub struct TestStore {
  pub temp: TempDir,
  pub store: LocalStore,
}

impl TestStore {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let store = LocalStore::open(&temp.path().join("root")).unwrap();
    Self { temp, store }
  }

  /// Add a single-file object named `name` whose content is its name.
  pub fn add(&self, name: &str, references: &[&StorePath]) -> StorePath {
    let sources = self.temp.path().join("sources");
    std::fs::create_dir_all(&sources).unwrap();
    let source = sources.join(name);
    std::fs::write(&source, name).unwrap();

    let references: BTreeSet<StorePath> = references.iter().map(|r| (*r).clone()).collect();
    self.store.add_to_store(&source, name, &references).unwrap()
  }

  /// Absolute printed form of `path`.
  pub fn print(&self, path: &StorePath) -> String {
    use crate::store::Store;
    self.store.print_store_path(path)
  }
}
