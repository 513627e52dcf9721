//! Profiles and their generations.
//!
//! A profile is a symlink to its current generation; generations are
//! numbered symlinks next to it that point into the store:
//!
//! ```text
//! default         -> default-3-link
//! default-2-link  -> /…/store/<hash>-hello
//! default-3-link  -> /…/store/<hash>-hello-tools
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, info};

use crate::platform::replace_symlink;
use crate::store::{LocalFsStore, StoreError, StorePath};

#[derive(Debug, Error)]
pub enum ProfileError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("failed to read profile directory {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("profile path {0} has no file name")]
  InvalidProfile(PathBuf),

  #[error("failed to switch {link} to {target}: {source}")]
  Switch {
    link: PathBuf,
    target: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
  pub number: u64,
  pub path: PathBuf,
  pub creation_time: Option<SystemTime>,
  pub current: bool,
}

fn split_profile(profile: &Path) -> Result<(&Path, String), ProfileError> {
  let name = profile
    .file_name()
    .ok_or_else(|| ProfileError::InvalidProfile(profile.to_path_buf()))?
    .to_string_lossy()
    .into_owned();
  let dir = profile.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
  Ok((dir, name))
}

fn parse_generation_number(profile_name: &str, file_name: &str) -> Option<u64> {
  file_name
    .strip_prefix(profile_name)?
    .strip_prefix('-')?
    .strip_suffix("-link")?
    .parse()
    .ok()
}

/// Path of generation `number` of `profile`.
pub fn generation_path(profile: &Path, number: u64) -> Result<PathBuf, ProfileError> {
  let (dir, name) = split_profile(profile)?;
  Ok(dir.join(format!("{}-{}-link", name, number)))
}

/// All generations of `profile`, oldest first.
pub fn generations(profile: &Path) -> Result<Vec<Generation>, ProfileError> {
  let (dir, name) = split_profile(profile)?;

  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(source) => {
      return Err(ProfileError::Io {
        path: dir.to_path_buf(),
        source,
      });
    }
  };

  let current = fs::read_link(profile)
    .ok()
    .and_then(|target| target.file_name().map(|n| n.to_os_string()));

  let mut generations = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|source| ProfileError::Io {
      path: dir.to_path_buf(),
      source,
    })?;
    let file_name = entry.file_name();
    let Some(number) = parse_generation_number(&name, &file_name.to_string_lossy()) else {
      continue;
    };
    let path = entry.path();
    let creation_time = fs::symlink_metadata(&path).and_then(|m| m.modified()).ok();
    generations.push(Generation {
      number,
      current: current.as_deref() == Some(file_name.as_os_str()),
      path,
      creation_time,
    });
  }

  generations.sort_by_key(|g| g.number);
  Ok(generations)
}

/// Create a generation of `profile` pointing at `path`.
///
/// If the newest generation already points at `path` it is returned instead.
pub fn create_generation(
  store: &dyn LocalFsStore,
  profile: &Path,
  path: &StorePath,
) -> Result<PathBuf, ProfileError> {
  let (dir, _) = split_profile(profile)?;
  fs::create_dir_all(dir).map_err(|source| ProfileError::Io {
    path: dir.to_path_buf(),
    source,
  })?;

  let existing = generations(profile)?;
  if let Some(last) = existing.last() {
    if fs::read_link(&last.path).ok().as_deref() == Some(store.real_path(path).as_path()) {
      debug!(generation = last.number, path = %path, "reusing generation");
      return Ok(last.path.clone());
    }
  }

  let number = existing.last().map_or(1, |g| g.number + 1);
  let link = generation_path(profile, number)?;
  let link = store.add_perm_root(path, &link)?;
  info!(profile = %profile.display(), generation = number, path = %path, "created generation");
  Ok(link)
}

/// Atomically point `link` at `target`.
///
/// A target in the same directory as the link is stored relative, so the
/// profile directory can be moved as a whole.
pub fn switch_link(link: &Path, target: &Path) -> Result<(), ProfileError> {
  let relative = match (link.parent(), target.parent(), target.file_name()) {
    (Some(a), Some(b), Some(name)) if a == b => Path::new(name),
    _ => target,
  };

  replace_symlink(relative, link).map_err(|source| ProfileError::Switch {
    link: link.to_path_buf(),
    target: target.to_path_buf(),
    source,
  })?;
  info!(link = %link.display(), target = %relative.display(), "switched profile");
  Ok(())
}
