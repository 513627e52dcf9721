//! Store access for sysp.
//!
//! The command layer talks to the store only through the `Store` trait. Two
//! implementations ship with the crate: `LocalStore`, a directory-backed store
//! that also supports profiles (`LocalFsStore`), and `DummyStore`, an empty
//! store without a filesystem.
//!
//! # Local layout
//!
//! ```text
//! <root>/
//! ├── store/<hash>-<name>/          # objects (immutable once registered)
//! └── var/
//!     ├── db/info/<hash>-<name>.json # PathInfo registrations
//!     └── gcroots/auto/<hash>        # indirect roots -> permanent root links
//! ```

pub mod copy;
pub mod dummy;
pub mod local;
pub mod path;
pub mod types;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

pub use copy::copy_paths;
pub use dummy::DummyStore;
pub use local::LocalStore;
pub use path::{StorePath, StorePathError};
pub use types::{PathInfo, StoreError};

/// Upper bound on symlink hops when following links into the store.
const MAX_SYMLINK_DEPTH: usize = 40;

pub trait Store {
  /// URI that reopens this store through `open_store`.
  fn uri(&self) -> String;

  fn store_dir(&self) -> &Path;

  fn print_store_path(&self, path: &StorePath) -> String {
    self.store_dir().join(path.as_str()).display().to_string()
  }

  fn is_in_store(&self, path: &Path) -> bool {
    path != self.store_dir() && path.starts_with(self.store_dir())
  }

  /// Parse an absolute path naming a store object exactly.
  fn parse_store_path(&self, path: &Path) -> Result<StorePath, StoreError> {
    let rel = path
      .strip_prefix(self.store_dir())
      .map_err(|_| not_in_store(self.store_dir(), path))?;
    let mut components = rel.components();
    match (components.next(), components.next()) {
      (Some(base), None) => Ok(StorePath::new(&base.as_os_str().to_string_lossy())?),
      _ => Err(not_in_store(self.store_dir(), path)),
    }
  }

  /// Map any path inside a store object to that object.
  fn to_store_path(&self, path: &Path) -> Result<StorePath, StoreError> {
    let rel = path
      .strip_prefix(self.store_dir())
      .map_err(|_| not_in_store(self.store_dir(), path))?;
    let base = rel.components().next().ok_or_else(|| not_in_store(self.store_dir(), path))?;
    Ok(StorePath::new(&base.as_os_str().to_string_lossy())?)
  }

  /// Follow symlinks (profiles, generation links, result links) until the
  /// path lands inside the store.
  fn follow_links_to_store_path(&self, path: &Path) -> Result<StorePath, StoreError> {
    let mut current = std::path::absolute(path).map_err(StoreError::io(path))?;

    for _ in 0..MAX_SYMLINK_DEPTH {
      if self.is_in_store(&current) {
        return self.to_store_path(&current);
      }
      match fs::symlink_metadata(&current) {
        Ok(meta) if meta.file_type().is_symlink() => {
          let target = fs::read_link(&current).map_err(StoreError::io(&current))?;
          current = if target.is_absolute() {
            target
          } else {
            current.parent().unwrap_or(Path::new("/")).join(target)
          };
        }
        _ => break,
      }
    }

    // A symlinked parent directory can still lead into the store.
    let resolved = dunce::canonicalize(&current).map_err(|_| not_in_store(self.store_dir(), path))?;
    self.to_store_path(&resolved)
  }

  fn is_valid_path(&self, path: &StorePath) -> Result<bool, StoreError>;

  fn query_all_valid_paths(&self) -> Result<Vec<StorePath>, StoreError>;

  /// Fails with `StoreError::NotValid` for unregistered paths.
  fn query_path_info(&self, path: &StorePath) -> Result<PathInfo, StoreError>;

  fn query_references(&self, path: &StorePath) -> Result<BTreeSet<StorePath>, StoreError> {
    Ok(self.query_path_info(path)?.references)
  }

  fn query_deriver(&self, path: &StorePath) -> Result<Option<StorePath>, StoreError> {
    Ok(self.query_path_info(path)?.deriver)
  }

  /// Add the transitive references of `paths` (and `paths` themselves) to `closure`.
  fn compute_fs_closure(
    &self,
    paths: &BTreeSet<StorePath>,
    closure: &mut BTreeSet<StorePath>,
  ) -> Result<(), StoreError> {
    let mut pending: Vec<StorePath> = paths.iter().cloned().collect();
    while let Some(path) = pending.pop() {
      if closure.contains(&path) {
        continue;
      }
      let references = self.query_references(&path)?;
      closure.insert(path);
      pending.extend(references.into_iter().filter(|r| !closure.contains(r)));
    }
    debug!(roots = paths.len(), size = closure.len(), "computed closure");
    Ok(())
  }

  fn query_missing(&self, paths: &[StorePath]) -> Result<Vec<StorePath>, StoreError> {
    let mut missing = Vec::new();
    for path in paths {
      if !self.is_valid_path(path)? {
        missing.push(path.clone());
      }
    }
    Ok(missing)
  }

  /// Make `paths` valid. Stores that cannot build fail on the first missing path.
  fn build_paths(&self, paths: &[StorePath]) -> Result<(), StoreError> {
    match self.query_missing(paths)?.first() {
      Some(missing) => Err(StoreError::CannotBuild(self.print_store_path(missing))),
      None => Ok(()),
    }
  }

  /// Local filesystem capability (profiles, permanent roots, imports).
  fn as_local_fs(&self) -> Option<&dyn LocalFsStore> {
    None
  }
}

fn not_in_store(store_dir: &Path, path: &Path) -> StoreError {
  StoreError::NotInStore {
    path: path.display().to_string(),
    store_dir: store_dir.to_path_buf(),
  }
}

/// A store whose objects are plain files under `store_dir`.
pub trait LocalFsStore: Store {
  fn real_path(&self, path: &StorePath) -> PathBuf {
    self.store_dir().join(path.as_str())
  }

  /// Point `link` at `path` and record it as a root of the store.
  fn add_perm_root(&self, path: &StorePath, link: &Path) -> Result<PathBuf, StoreError>;

  /// Copy `source` into the store under `name`; every reference must be valid.
  fn add_to_store(
    &self,
    source: &Path,
    name: &str,
    references: &BTreeSet<StorePath>,
  ) -> Result<StorePath, StoreError>;

  /// Copy the tree at `source` to `info.path` and register it with `info`.
  fn import_path(&self, info: &PathInfo, source: &Path) -> Result<(), StoreError>;
}

/// Open the store named by `uri`.
///
/// - `""`, `auto`, `local`: local store at `default_root`
/// - `local?root=<dir>` or an absolute directory: local store rooted there
/// - `dummy`, `dummy://`: empty store without filesystem access
pub fn open_store(uri: &str, default_root: &Path) -> Result<Rc<dyn Store>, StoreError> {
  debug!(uri = %uri, "opening store");
  match uri {
    "" | "auto" | "local" => Ok(Rc::new(LocalStore::open(default_root)?)),
    "dummy" | "dummy://" => Ok(Rc::new(DummyStore::new())),
    _ => {
      if let Some(root) = uri.strip_prefix("local?root=") {
        return Ok(Rc::new(LocalStore::open(Path::new(root))?));
      }
      let path = Path::new(uri);
      if path.is_absolute() {
        return Ok(Rc::new(LocalStore::open(path)?));
      }
      Err(StoreError::UnsupportedUri(uri.to_string()))
    }
  }
}
