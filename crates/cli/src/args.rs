//! Reusable argument groups.
//!
//! Commands flatten the groups they need and turn each one into the matching
//! `sysp_lib::command` capability.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Args;

use sysp_lib::command::{EnvironmentControl, EvalHandle, ProfileUpdater, StorePathsOptions};
use sysp_lib::eval::SearchPath;
use sysp_lib::installable::{OperateOn, Realise};

/// Options for commands whose arguments may need evaluating.
#[derive(Args, Debug, Clone, Default)]
pub struct EvalArgs {
  /// Expression file for bare attribute paths (default: `<default>`, then ./default.lua)
  #[arg(short, long, value_name = "FILE")]
  pub file: Option<String>,

  /// Start an interactive inspector when evaluation fails
  #[arg(long)]
  pub start_repl_on_eval_errors: bool,
}

impl EvalArgs {
  pub fn handle(&self, search_path: SearchPath) -> EvalHandle {
    EvalHandle::new(search_path, self.start_repl_on_eval_errors)
  }
}

/// Closure expansion for commands that operate on closures by default.
#[derive(Args, Debug, Clone, Default)]
pub struct RecursiveByDefault {
  /// Only operate on the given paths, not their closure
  #[arg(long)]
  pub no_recursive: bool,
}

impl RecursiveByDefault {
  pub fn recursive(&self) -> bool {
    !self.no_recursive
  }
}

/// Closure expansion for commands that operate on the given paths by default.
#[derive(Args, Debug, Clone, Default)]
pub struct DirectByDefault {
  /// Apply to the closure of the given paths
  #[arg(short, long)]
  pub recursive: bool,
}

impl DirectByDefault {
  pub fn recursive(&self) -> bool {
    self.recursive
  }
}

#[derive(Args, Debug, Clone, Default)]
pub struct AllArgs {
  /// Apply to every valid path in the store
  #[arg(long)]
  pub all: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OperateOnArgs {
  /// Operate on the derivations producing the arguments instead of their outputs
  #[arg(long)]
  pub derivation: bool,
}

impl OperateOnArgs {
  pub fn operate_on(&self) -> OperateOn {
    if self.derivation {
      OperateOn::Derivation
    } else {
      OperateOn::Output
    }
  }
}

/// Resolver options assembled from the groups above.
pub fn store_paths_options(all: &AllArgs, recursive: bool, realise: Realise, operate_on: OperateOn) -> StorePathsOptions {
  StorePathsOptions {
    all: all.all,
    recursive,
    realise,
    operate_on,
  }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
  /// Profile to update with the result
  #[arg(long, value_name = "PATH")]
  pub profile: Option<PathBuf>,
}

impl ProfileArgs {
  pub fn updater(&self) -> ProfileUpdater {
    ProfileUpdater::new(self.profile.clone())
  }

  pub fn updater_with_default(&self, default_profile: PathBuf) -> ProfileUpdater {
    ProfileUpdater::with_default(self.profile.clone(), default_profile)
  }
}

#[derive(Args, Debug, Clone, Default)]
pub struct EnvironmentArgs {
  /// Clear the environment; only variables named with --keep survive
  #[arg(short, long)]
  pub ignore_environment: bool,

  /// Keep this variable when using --ignore-environment
  #[arg(short, long, value_name = "NAME")]
  pub keep: Vec<String>,

  /// Remove this variable from the environment
  #[arg(short, long, value_name = "NAME")]
  pub unset: Vec<String>,
}

impl EnvironmentArgs {
  pub fn control(&self) -> EnvironmentControl {
    EnvironmentControl {
      ignore_environment: self.ignore_environment,
      keep: self.keep.iter().cloned().collect::<BTreeSet<_>>(),
      unset: self.unset.iter().cloned().collect::<BTreeSet<_>>(),
    }
  }
}
