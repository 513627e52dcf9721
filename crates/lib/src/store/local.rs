//! Directory-backed store.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::path::check_name;
use super::{LocalFsStore, PathInfo, Store, StoreError, StorePath, StorePathError};
use crate::platform::{create_symlink, replace_symlink};
use crate::util::hash::{hash_bytes, hash_tree, store_hash_part};

const STORE_DIR: &str = "store";
const INFO_DIR: &str = "var/db/info";
const AUTO_ROOTS_DIR: &str = "var/gcroots/auto";

/// A store rooted at a local directory. See the module docs of `store` for the layout.
#[derive(Debug, Clone)]
pub struct LocalStore {
  root: PathBuf,
  store_dir: PathBuf,
}

impl LocalStore {
  /// Open (creating if needed) the store rooted at `root`.
  pub fn open(root: &Path) -> Result<Self, StoreError> {
    for dir in [STORE_DIR, INFO_DIR, AUTO_ROOTS_DIR] {
      let dir = root.join(dir);
      fs::create_dir_all(&dir).map_err(StoreError::io(&dir))?;
    }
    let root = dunce::canonicalize(root).map_err(StoreError::io(root))?;
    Ok(Self {
      store_dir: root.join(STORE_DIR),
      root,
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn info_path(&self, path: &StorePath) -> PathBuf {
    self.root.join(INFO_DIR).join(format!("{}.json", path))
  }

  fn read_info(&self, path: &StorePath) -> Result<Option<PathInfo>, StoreError> {
    let info_path = self.info_path(path);
    let content = match fs::read_to_string(&info_path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(StoreError::Io { path: info_path, source: e }),
    };
    let info = serde_json::from_str(&content).map_err(|source| StoreError::Registration {
      path: info_path,
      source,
    })?;
    Ok(Some(info))
  }

  /// Write a registration atomically (temp file, then rename).
  fn write_info(&self, info: &PathInfo) -> Result<(), StoreError> {
    let path = self.info_path(&info.path);
    let temp_path = path.with_extension("json.tmp");

    let content = serde_json::to_string_pretty(info).map_err(|source| StoreError::Registration {
      path: path.clone(),
      source,
    })?;
    fs::write(&temp_path, content).map_err(StoreError::io(&temp_path))?;
    fs::rename(&temp_path, &path).map_err(StoreError::io(&path))?;
    Ok(())
  }

  /// Register an object already present under `store_dir`.
  pub fn register_valid_path(&self, info: PathInfo) -> Result<(), StoreError> {
    let real = self.real_path(&info.path);
    if fs::symlink_metadata(&real).is_err() {
      return Err(StoreError::NotValid(real.display().to_string()));
    }
    self.check_references(&info.path, &info.references)?;
    self.write_info(&info)?;
    debug!(path = %info.path, "registered valid path");
    Ok(())
  }

  fn check_references(&self, path: &StorePath, references: &BTreeSet<StorePath>) -> Result<(), StoreError> {
    for reference in references.iter().filter(|r| *r != path) {
      if !self.is_valid_path(reference)? {
        return Err(StoreError::NotValid(self.print_store_path(reference)));
      }
    }
    Ok(())
  }

  /// Copy `source` to the object location of `path` via a temporary sibling.
  ///
  /// Returns the number of bytes copied.
  fn materialize(&self, source: &Path, path: &StorePath) -> Result<u64, StoreError> {
    let dest = self.real_path(path);
    let temp = self.store_dir.join(format!(".tmp-{}", path));

    remove_tree(&temp)?;
    let size = copy_tree(source, &temp)?;
    // Leftover from an interrupted import that never got registered.
    remove_tree(&dest)?;
    fs::rename(&temp, &dest).map_err(StoreError::io(&dest))?;
    Ok(size)
  }
}

impl Store for LocalStore {
  fn uri(&self) -> String {
    format!("local?root={}", self.root.display())
  }

  fn store_dir(&self) -> &Path {
    &self.store_dir
  }

  fn is_valid_path(&self, path: &StorePath) -> Result<bool, StoreError> {
    Ok(self.info_path(path).is_file() && fs::symlink_metadata(self.real_path(path)).is_ok())
  }

  fn query_all_valid_paths(&self) -> Result<Vec<StorePath>, StoreError> {
    let info_dir = self.root.join(INFO_DIR);
    let entries = fs::read_dir(&info_dir).map_err(StoreError::io(&info_dir))?;

    let mut paths = Vec::new();
    for entry in entries.flatten() {
      let file_name = entry.file_name();
      let Some(base) = file_name.to_str().and_then(|n| n.strip_suffix(".json")) else {
        continue;
      };
      match StorePath::new(base) {
        Ok(path) if fs::symlink_metadata(self.real_path(&path)).is_ok() => paths.push(path),
        Ok(path) => warn!(path = %path, "registration without store object"),
        Err(e) => warn!(error = %e, "skipping malformed registration"),
      }
    }
    paths.sort();
    Ok(paths)
  }

  fn query_path_info(&self, path: &StorePath) -> Result<PathInfo, StoreError> {
    match self.read_info(path)? {
      Some(info) if fs::symlink_metadata(self.real_path(path)).is_ok() => Ok(info),
      _ => Err(StoreError::NotValid(self.print_store_path(path))),
    }
  }

  fn as_local_fs(&self) -> Option<&dyn LocalFsStore> {
    Some(self)
  }
}

impl LocalFsStore for LocalStore {
  fn add_perm_root(&self, path: &StorePath, link: &Path) -> Result<PathBuf, StoreError> {
    if !self.is_valid_path(path)? {
      return Err(StoreError::NotValid(self.print_store_path(path)));
    }

    replace_symlink(&self.real_path(path), link).map_err(StoreError::io(link))?;

    let link = std::path::absolute(link).map_err(StoreError::io(link))?;
    let digest = hash_bytes(link.to_string_lossy().as_bytes());
    let indirect = self.root.join(AUTO_ROOTS_DIR).join(&digest.0[..20]);
    replace_symlink(&link, &indirect).map_err(StoreError::io(&indirect))?;

    debug!(path = %path, link = %link.display(), "added permanent root");
    Ok(link)
  }

  fn add_to_store(
    &self,
    source: &Path,
    name: &str,
    references: &BTreeSet<StorePath>,
  ) -> Result<StorePath, StoreError> {
    check_name(name).map_err(|reason| StorePathError {
      path: name.to_string(),
      reason,
    })?;
    for reference in references {
      if !self.is_valid_path(reference)? {
        return Err(StoreError::NotValid(self.print_store_path(reference)));
      }
    }

    let content = hash_tree(source)?;
    let hash = store_hash_part(&content, name, references.iter().map(StorePath::as_str));
    let path = StorePath::from_parts(&hash, name)?;

    if self.is_valid_path(&path)? {
      debug!(path = %path, "already in store");
      return Ok(path);
    }

    let nar_size = self.materialize(source, &path)?;
    self.write_info(&PathInfo {
      path: path.clone(),
      nar_hash: content.0,
      nar_size,
      references: references.clone(),
      deriver: None,
      registration_time: now(),
    })?;

    info!(path = %self.print_store_path(&path), "added to store");
    Ok(path)
  }

  fn import_path(&self, info: &PathInfo, source: &Path) -> Result<(), StoreError> {
    if self.is_valid_path(&info.path)? {
      return Ok(());
    }
    self.check_references(&info.path, &info.references)?;

    self.materialize(source, &info.path)?;
    self.write_info(&PathInfo {
      registration_time: now(),
      ..info.clone()
    })?;

    debug!(path = %info.path, "imported path");
    Ok(())
  }
}

fn now() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_secs()
}

fn remove_tree(path: &Path) -> Result<(), StoreError> {
  let result = match fs::symlink_metadata(path) {
    Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
    Ok(_) => fs::remove_file(path),
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
    Err(e) => Err(e),
  };
  result.map_err(StoreError::io(path))
}

/// Copy a file, symlink or directory tree without following symlinks.
fn copy_tree(source: &Path, dest: &Path) -> Result<u64, StoreError> {
  let meta = fs::symlink_metadata(source).map_err(StoreError::io(source))?;
  if meta.file_type().is_symlink() {
    let target = fs::read_link(source).map_err(StoreError::io(source))?;
    create_symlink(&target, dest).map_err(StoreError::io(dest))?;
    return Ok(0);
  }
  if meta.is_file() {
    return fs::copy(source, dest).map_err(StoreError::io(dest));
  }

  let mut size = 0;
  for entry in WalkDir::new(source).follow_links(false) {
    let entry = entry.map_err(|e| StoreError::Io {
      path: source.to_path_buf(),
      source: e.into(),
    })?;
    let rel = entry.path().strip_prefix(source).unwrap_or(entry.path());
    let target = if rel.as_os_str().is_empty() {
      dest.to_path_buf()
    } else {
      dest.join(rel)
    };

    let file_type = entry.file_type();
    if file_type.is_dir() {
      fs::create_dir_all(&target).map_err(StoreError::io(&target))?;
    } else if file_type.is_symlink() {
      let link_target = fs::read_link(entry.path()).map_err(StoreError::io(entry.path()))?;
      create_symlink(&link_target, &target).map_err(StoreError::io(&target))?;
    } else if file_type.is_file() {
      size += fs::copy(entry.path(), &target).map_err(StoreError::io(&target))?;
    }
  }
  Ok(size)
}
