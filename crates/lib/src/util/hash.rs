//! Digests used to name and verify store objects.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::consts::OBJ_HASH_PREFIX_LEN;

/// Lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
  fn from_hasher(hasher: Sha256) -> Self {
    ContentHash(format!("{:x}", hasher.finalize()))
  }
}

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, thiserror::Error)]
pub enum TreeHashError {
  #[error("cannot traverse {}", root.display())]
  Walk {
    root: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("cannot read {}", path.display())]
  ReadFile {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot read link {}", path.display())]
  ReadSymlink {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Serialised record for a single tree entry. The digest of a tree is the
/// digest of its records in walk order.
enum Record {
  Dir,
  File { executable: bool, digest: ContentHash },
  Link(String),
}

impl Record {
  fn tag(&self) -> String {
    match self {
      Record::Dir => "dir".to_string(),
      Record::File { executable: true, digest } => format!("exe {digest}"),
      Record::File { executable: false, digest } => format!("reg {digest}"),
      Record::Link(target) => format!("sym {target}"),
    }
  }
}

/// Digest of a file or directory tree.
///
/// Only names, contents, the executable bit and link targets are covered.
pub fn hash_tree(root: &Path) -> Result<ContentHash, TreeHashError> {
  let mut hasher = Sha256::new();

  let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
  for entry in walker {
    let entry = entry.map_err(|source| TreeHashError::Walk { root: root.to_path_buf(), source })?;
    let path = entry.path();
    let kind = entry.file_type();

    let record = if kind.is_dir() {
      Record::Dir
    } else if kind.is_file() {
      Record::File { executable: is_executable(path), digest: hash_file(path)? }
    } else if kind.is_symlink() {
      let target = fs::read_link(path).map_err(|source| TreeHashError::ReadSymlink {
        path: path.to_path_buf(),
        source,
      })?;
      Record::Link(target.to_string_lossy().into_owned())
    } else {
      // sockets, fifos and devices cannot live in the store
      continue;
    };

    let name = path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/");
    hasher.update(format!("{}\0{name}\0", record.tag()).as_bytes());
  }

  Ok(ContentHash::from_hasher(hasher))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
  use std::os::unix::fs::PermissionsExt;
  fs::metadata(path).is_ok_and(|meta| meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
  false
}

/// Digest of one file's contents.
pub fn hash_file(path: &Path) -> Result<ContentHash, TreeHashError> {
  let read_err = |source| TreeHashError::ReadFile { path: path.to_path_buf(), source };
  let mut file = fs::File::open(path).map_err(read_err)?;
  let mut hasher = Sha256::new();
  io::copy(&mut file, &mut hasher).map_err(read_err)?;
  Ok(ContentHash::from_hasher(hasher))
}

pub fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash::from_hasher(Sha256::new_with_prefix(data))
}

/// Hash part of the store path that `content` lands at when added as `name`.
///
/// References are folded in, so the same tree registered with different
/// dependencies gets a different path.
pub fn store_hash_part<'a>(
  content: &ContentHash,
  name: &str,
  references: impl IntoIterator<Item = &'a str>,
) -> String {
  let mut hasher = Sha256::new_with_prefix(format!("source:sha256:{content}:{name}"));
  for reference in references {
    hasher.update(b":");
    hasher.update(reference.as_bytes());
  }
  let mut part = ContentHash::from_hasher(hasher).0;
  part.truncate(OBJ_HASH_PREFIX_LEN);
  part
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::create_symlink;
  use tempfile::TempDir;

  fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, body) in files {
      let path = dir.path().join(rel);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(path, body).unwrap();
    }
    dir
  }

  #[test]
  fn identical_trees_share_a_digest() {
    let a = tree(&[("bin/hello", "#!/bin/sh"), ("share/doc", "docs")]);
    let b = tree(&[("share/doc", "docs"), ("bin/hello", "#!/bin/sh")]);

    let digest = hash_tree(a.path()).unwrap();
    assert_eq!(digest, hash_tree(b.path()).unwrap());
    assert_eq!(digest.0.len(), 64);
  }

  #[test]
  fn contents_and_layout_both_matter() {
    let flat = tree(&[("file", "x")]);
    let nested = tree(&[("sub/file", "x")]);
    let edited = tree(&[("file", "y")]);

    let flat_digest = hash_tree(flat.path()).unwrap();
    assert_ne!(flat_digest, hash_tree(nested.path()).unwrap());
    assert_ne!(flat_digest, hash_tree(edited.path()).unwrap());
  }

  #[test]
  fn file_root_hashes_its_contents() {
    let dir = tree(&[("hello", "hello world")]);
    let single = dir.path().join("hello");
    assert!(hash_tree(&single).is_ok());
    assert_eq!(hash_file(&single).unwrap(), hash_bytes(b"hello world"));
  }

  #[test]
  fn missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let err = hash_file(&dir.path().join("absent")).unwrap_err();
    assert!(err.to_string().contains("absent"));
  }

  #[cfg(unix)]
  #[test]
  fn executable_bit_is_covered() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tree(&[("run", "echo")]);
    let before = hash_tree(dir.path()).unwrap();
    fs::set_permissions(dir.path().join("run"), fs::Permissions::from_mode(0o755)).unwrap();
    assert_ne!(before, hash_tree(dir.path()).unwrap());
  }

  #[test]
  fn link_targets_are_covered() {
    let dir = TempDir::new().unwrap();
    let link = dir.path().join("link");
    create_symlink(Path::new("a"), &link).unwrap();
    let before = hash_tree(dir.path()).unwrap();

    fs::remove_file(&link).unwrap();
    create_symlink(Path::new("b"), &link).unwrap();
    assert_ne!(before, hash_tree(dir.path()).unwrap());
  }

  #[test]
  fn store_hash_part_folds_in_name_and_references() {
    let content = hash_bytes(b"payload");

    let plain = store_hash_part(&content, "hello", []);
    assert_eq!(plain.len(), OBJ_HASH_PREFIX_LEN);
    assert!(plain.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(plain, store_hash_part(&content, "hello2", []));
    assert_ne!(plain, store_hash_part(&content, "hello", ["00000000000000000000-dep"]));
  }
}
