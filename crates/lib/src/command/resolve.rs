//! Turning installables into the store paths a command operates on.

use std::collections::BTreeSet;

use tracing::debug;

use super::CommandError;
use crate::installable::{Installable, OperateOn, Realise, to_store_paths};
use crate::store::{Store, StorePath};

/// How a multi-path command resolves its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorePathsOptions {
  /// Operate on every valid path; no installables allowed.
  pub all: bool,
  /// Expand the result to its closure.
  pub recursive: bool,
  pub realise: Realise,
  pub operate_on: OperateOn,
}

impl StorePathsOptions {
  /// Reject installables in `--all` mode. Called before parsing arguments so
  /// that the usage error wins over parse failures.
  pub fn check_arguments(&self, count: usize) -> Result<(), CommandError> {
    if self.all && count > 0 {
      return Err(CommandError::usage("'--all' does not expect arguments"));
    }
    Ok(())
  }

  pub fn resolve_store_paths(
    &self,
    store: &dyn Store,
    installables: &[Box<dyn Installable>],
  ) -> Result<Vec<StorePath>, CommandError> {
    self.check_arguments(installables.len())?;

    if self.all {
      return Ok(store.query_all_valid_paths()?);
    }

    let paths = to_store_paths(store, self.realise, self.operate_on, installables)?;
    if !self.recursive {
      return Ok(paths);
    }

    let roots: BTreeSet<StorePath> = paths.into_iter().collect();
    let mut closure = BTreeSet::new();
    store.compute_fs_closure(&roots, &mut closure)?;
    debug!(roots = roots.len(), closure = closure.len(), "expanded to closure");
    Ok(closure.into_iter().collect())
  }
}

/// Resolve exactly one store path without realising anything.
pub fn resolve_single_path(
  store: &dyn Store,
  installables: &[Box<dyn Installable>],
) -> Result<StorePath, CommandError> {
  let mut paths = to_store_paths(store, Realise::Nothing, OperateOn::Output, installables)?;
  if paths.len() != 1 {
    return Err(CommandError::usage("this command requires exactly one store path"));
  }
  Ok(paths.remove(0))
}
