//! Platform-specific locations and filesystem primitives.

pub mod paths;

use std::io;
use std::path::Path;

/// Create a symlink at `link` pointing to `target`.
///
/// On Windows the target kind decides between a directory and a file link.
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(target, link)
  }
  #[cfg(windows)]
  {
    if target.is_dir() {
      std::os::windows::fs::symlink_dir(target, link)
    } else {
      std::os::windows::fs::symlink_file(target, link)
    }
  }
}

/// Atomically point `link` at `target`.
///
/// The new link is created under a temporary name in the same directory and
/// renamed over `link`, so readers see either the old or the new target.
pub fn replace_symlink(target: &Path, link: &Path) -> io::Result<()> {
  let dir = link.parent().unwrap_or(Path::new("."));
  let name = link
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  let temp_link = dir.join(format!(".{}.tmp-{}", name, std::process::id()));

  match std::fs::remove_file(&temp_link) {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => return Err(e),
  }

  create_symlink(target, &temp_link)?;
  if let Err(e) = std::fs::rename(&temp_link, link) {
    let _ = std::fs::remove_file(&temp_link);
    return Err(e);
  }
  Ok(())
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn replace_symlink_creates_missing_link() {
    let temp = TempDir::new().unwrap();
    let link = temp.path().join("link");

    replace_symlink(Path::new("target-a"), &link).unwrap();

    assert_eq!(std::fs::read_link(&link).unwrap(), Path::new("target-a"));
  }

  #[test]
  fn replace_symlink_overwrites_existing_link() {
    let temp = TempDir::new().unwrap();
    let link = temp.path().join("link");

    replace_symlink(Path::new("target-a"), &link).unwrap();
    replace_symlink(Path::new("target-b"), &link).unwrap();

    assert_eq!(std::fs::read_link(&link).unwrap(), Path::new("target-b"));
    let leftovers: Vec<_> = std::fs::read_dir(temp.path())
      .unwrap()
      .flatten()
      .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
      .collect();
    assert!(leftovers.is_empty());
  }
}
