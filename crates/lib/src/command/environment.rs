//! Environment of processes spawned by a command.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::{OsStr, OsString};
use std::process::Command;

use tracing::debug;

use super::CommandError;

/// Which variables of the ambient environment a child process sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentControl {
  pub ignore_environment: bool,
  /// Kept with `ignore_environment`.
  pub keep: BTreeSet<String>,
  /// Removed without `ignore_environment`.
  pub unset: BTreeSet<String>,
}

impl EnvironmentControl {
  /// Compute the effective environment from the current process environment.
  pub fn activate(&self) -> Result<Environment, CommandError> {
    self.activate_from(std::env::vars_os())
  }

  pub fn activate_from(
    &self,
    ambient: impl IntoIterator<Item = (OsString, OsString)>,
  ) -> Result<Environment, CommandError> {
    let ambient = ambient.into_iter();

    let vars: BTreeMap<OsString, OsString> = if self.ignore_environment {
      if !self.unset.is_empty() {
        return Err(CommandError::usage("--unset does not make sense with --ignore-environment"));
      }
      ambient
        .filter(|(name, _)| name.to_str().is_some_and(|n| self.keep.contains(n)))
        .collect()
    } else {
      if !self.keep.is_empty() {
        return Err(CommandError::usage("--keep does not make sense without --ignore-environment"));
      }
      ambient
        .filter(|(name, _)| !name.to_str().is_some_and(|n| self.unset.contains(n)))
        .collect()
    };

    debug!(count = vars.len(), ignore = self.ignore_environment, "environment activated");
    Ok(Environment { vars })
  }
}

/// An explicit variable set for a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
  vars: BTreeMap<OsString, OsString>,
}

impl Environment {
  pub fn get(&self, name: impl AsRef<OsStr>) -> Option<&OsStr> {
    self.vars.get(name.as_ref()).map(OsString::as_os_str)
  }

  pub fn set(&mut self, name: impl Into<OsString>, value: impl Into<OsString>) {
    self.vars.insert(name.into(), value.into());
  }

  pub fn vars(&self) -> &BTreeMap<OsString, OsString> {
    &self.vars
  }

  /// Replace the environment of `command` with this one.
  pub fn apply<'a>(&self, command: &'a mut Command) -> &'a mut Command {
    command.env_clear().envs(&self.vars)
  }
}
