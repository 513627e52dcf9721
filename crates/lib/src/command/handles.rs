//! Lazily constructed store and evaluator handles.

use std::cell::OnceCell;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use super::CommandError;
use crate::eval::{EvalState, SearchPath, repl};
use crate::installable::{Installable, InstallableError, parse_installables};
use crate::store::{Store, StoreError, open_store};

/// Strategy used by `StoreHandle` to open its store.
pub type StoreFactory = Box<dyn Fn() -> Result<Rc<dyn Store>, StoreError>>;

/// The store of one command, opened on first use and reused afterwards.
pub struct StoreHandle {
  store: OnceCell<Rc<dyn Store>>,
  create_store: StoreFactory,
}

impl StoreHandle {
  pub fn new(create_store: StoreFactory) -> Self {
    Self {
      store: OnceCell::new(),
      create_store,
    }
  }

  /// Open the store named by `uri` (see `open_store`).
  pub fn from_uri(uri: impl Into<String>, default_root: impl Into<PathBuf>) -> Self {
    let uri = uri.into();
    let default_root = default_root.into();
    Self::new(Box::new(move || open_store(&uri, &default_root)))
  }

  pub fn get_store(&self) -> Result<Rc<dyn Store>, StoreError> {
    if let Some(store) = self.store.get() {
      return Ok(store.clone());
    }
    let store = (self.create_store)()?;
    debug!(uri = %store.uri(), "store opened");
    Ok(self.store.get_or_init(|| store).clone())
  }
}

/// The evaluator of one command, created on first use.
pub struct EvalHandle {
  state: OnceCell<Rc<EvalState>>,
  search_path: SearchPath,
  start_repl_on_eval_errors: bool,
}

impl EvalHandle {
  pub fn new(search_path: SearchPath, start_repl_on_eval_errors: bool) -> Self {
    Self {
      state: OnceCell::new(),
      search_path,
      start_repl_on_eval_errors,
    }
  }

  /// The shared evaluator, built over `store` the first time.
  ///
  /// With `start_repl_on_eval_errors`, the inspector hook is registered once here.
  pub fn get_eval_state(&self, store: &StoreHandle) -> Result<Rc<EvalState>, CommandError> {
    Ok(self.state(store)?)
  }

  /// Parse command-line installables, creating the evaluator only if an
  /// argument needs it.
  pub fn parse_installables(
    &self,
    store: &StoreHandle,
    args: &[String],
    file: Option<&str>,
  ) -> Result<Vec<Box<dyn Installable>>, CommandError> {
    let eval_state = || self.state(store);
    Ok(parse_installables(&store.get_store()?, args, file, &eval_state)?)
  }

  fn state(&self, store: &StoreHandle) -> Result<Rc<EvalState>, InstallableError> {
    if let Some(state) = self.state.get() {
      return Ok(state.clone());
    }

    let mut state = EvalState::new(self.search_path.clone(), store.get_store()?)?;
    if self.start_repl_on_eval_errors {
      state.set_debug_hook(repl::inspector_hook());
    }
    Ok(self.state.get_or_init(|| Rc::new(state)).clone())
  }
}
