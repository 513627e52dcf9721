//! Capabilities shared by the command-line commands.
//!
//! Each command composes the pieces it needs: a `StoreHandle` (always), an
//! `EvalHandle` when arguments may need evaluating, and optionally a
//! `StorePathsOptions` resolver, a `ProfileUpdater` or an
//! `EnvironmentControl`.

pub mod editor;
pub mod environment;
pub mod handles;
pub mod profile;
pub mod resolve;

use thiserror::Error;

use crate::eval::EvalError;
use crate::installable::InstallableError;
use crate::profile::ProfileError;
use crate::store::StoreError;

pub use editor::editor_for;
pub use environment::{Environment, EnvironmentControl};
pub use handles::{EvalHandle, StoreHandle};
pub use profile::ProfileUpdater;
pub use resolve::{StorePathsOptions, resolve_single_path};

#[derive(Debug, Error)]
pub enum CommandError {
  /// The invocation itself is wrong (contradictory flags, argument counts).
  #[error("{0}")]
  Usage(String),

  /// The request is well-formed but this store cannot serve it.
  #[error("{0}")]
  Unsupported(String),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Eval(#[from] EvalError),

  #[error(transparent)]
  Installable(#[from] InstallableError),

  #[error(transparent)]
  Profile(#[from] ProfileError),
}

impl CommandError {
  pub fn usage(message: impl Into<String>) -> Self {
    CommandError::Usage(message.into())
  }

  pub fn is_usage(&self) -> bool {
    matches!(self, CommandError::Usage(_))
  }
}
