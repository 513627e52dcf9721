//! Pointing a profile at the result of a command.

use std::path::{Path, PathBuf};

use super::CommandError;
use crate::installable::Buildable;
use crate::profile::{create_generation, switch_link};
use crate::store::{Store, StorePath};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdater {
  profile: Option<PathBuf>,
}

impl ProfileUpdater {
  pub fn new(profile: Option<PathBuf>) -> Self {
    Self { profile }
  }

  /// Like `new`, falling back to `default_profile` when none is given.
  pub fn with_default(profile: Option<PathBuf>, default_profile: PathBuf) -> Self {
    Self {
      profile: Some(profile.unwrap_or(default_profile)),
    }
  }

  pub fn profile(&self) -> Option<&Path> {
    self.profile.as_deref()
  }

  /// Add a generation for `path` and switch the profile to it.
  ///
  /// Does nothing without a profile. If the switch fails the new generation
  /// stays behind; it is reused by the next update to the same path.
  pub fn update_profile(&self, store: &dyn Store, path: &StorePath) -> Result<(), CommandError> {
    let Some(profile) = &self.profile else {
      return Ok(());
    };
    let local = store
      .as_local_fs()
      .ok_or_else(|| CommandError::Unsupported("'--profile' is not supported for this store".to_string()))?;

    let generation = create_generation(local, profile, path)?;
    switch_link(profile, &generation)?;
    Ok(())
  }

  /// Update the profile from buildables that must contain exactly one output.
  pub fn update_profile_from_buildables(
    &self,
    store: &dyn Store,
    buildables: &[Buildable],
  ) -> Result<(), CommandError> {
    if self.profile.is_none() {
      return Ok(());
    }

    let mut result: Option<&StorePath> = None;
    for path in buildables.iter().flat_map(|b| b.outputs.values()) {
      if result.is_some() {
        return Err(CommandError::usage(
          "'--profile' requires that the arguments produce a single store path, but there are multiple",
        ));
      }
      result = Some(path);
    }

    let path = result.ok_or_else(|| {
      CommandError::usage("'--profile' requires that the arguments produce a single store path, but there are none")
    })?;
    self.update_profile(store, path)
  }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use crate::store::DummyStore;
  use crate::util::testutil::TestStore;
  use std::fs;

  #[test]
  fn no_profile_is_a_no_op() {
    let updater = ProfileUpdater::new(None);
    let ghost = StorePath::from_parts("ffffffffffffffffffff", "ghost").unwrap();

    updater.update_profile(&DummyStore::new(), &ghost).unwrap();
    updater.update_profile_from_buildables(&DummyStore::new(), &[]).unwrap();
  }

  #[test]
  fn non_local_store_is_unsupported() {
    let temp = tempfile::TempDir::new().unwrap();
    let updater = ProfileUpdater::new(Some(temp.path().join("default")));
    let ghost = StorePath::from_parts("ffffffffffffffffffff", "ghost").unwrap();

    let err = updater.update_profile(&DummyStore::new(), &ghost).unwrap_err();
    assert!(!err.is_usage());
    assert_eq!(err.to_string(), "'--profile' is not supported for this store");
  }

  #[test]
  fn buildables_must_produce_one_path() {
    let fixture = TestStore::new();
    let a = fixture.add("a", &[]);
    let b = fixture.add("b", &[]);
    let profile = fixture.temp.path().join("default");
    let updater = ProfileUpdater::new(Some(profile.clone()));

    let err = updater.update_profile_from_buildables(&fixture.store, &[]).unwrap_err();
    assert!(err.is_usage());
    assert!(err.to_string().ends_with("but there are none"));

    let two = [Buildable::single(a.clone()), Buildable::single(b)];
    let err = updater.update_profile_from_buildables(&fixture.store, &two).unwrap_err();
    assert!(err.is_usage());
    assert!(err.to_string().ends_with("but there are multiple"));
    assert!(fs::symlink_metadata(&profile).is_err());

    updater
      .update_profile_from_buildables(&fixture.store, &[Buildable::single(a.clone())])
      .unwrap();
    assert_eq!(fs::read_link(&profile).unwrap(), Path::new("default-1-link"));
    assert_eq!(fixture.store.follow_links_to_store_path(&profile).unwrap(), a);
  }

  #[test]
  fn default_profile_fills_in() {
    let updater = ProfileUpdater::with_default(None, PathBuf::from("/p/default"));
    assert_eq!(updater.profile(), Some(Path::new("/p/default")));

    let updater = ProfileUpdater::with_default(Some(PathBuf::from("/p/other")), PathBuf::from("/p/default"));
    assert_eq!(updater.profile(), Some(Path::new("/p/other")));
  }
}
