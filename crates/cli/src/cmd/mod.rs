pub mod add;
pub mod build;
pub mod copy;
pub mod edit;
pub mod generations;
pub mod install;
pub mod path_info;
pub mod references;
pub mod run;

use std::rc::Rc;

use sysp_lib::command::{EvalHandle, StoreHandle};
use sysp_lib::eval::SearchPath;
use sysp_lib::installable::Installable;
use sysp_lib::settings::Settings;
use sysp_lib::store::Store;

use crate::args::EvalArgs;
use crate::output::OutputFormat;

/// State shared by every command: settings, the lazily opened store and
/// global flags.
pub struct Context {
  pub settings: Settings,
  pub store: StoreHandle,
  pub search_path: SearchPath,
  pub output: OutputFormat,
}

impl Context {
  pub fn new(settings: Settings, store_uri: Option<String>, include: &[String], output: OutputFormat) -> Self {
    let uri = store_uri.unwrap_or_else(|| settings.store_uri.clone());
    let store = StoreHandle::from_uri(uri, settings.store_root.clone());
    let search_path = settings.search_path(include);
    Self {
      settings,
      store,
      search_path,
      output,
    }
  }

  pub fn store(&self) -> anyhow::Result<Rc<dyn Store>> {
    Ok(self.store.get_store()?)
  }

  pub fn eval_handle(&self, eval: &EvalArgs) -> EvalHandle {
    eval.handle(self.search_path.clone())
  }

  /// Parse installables, evaluating expressions through `eval` when needed.
  pub fn installables(
    &self,
    eval: &EvalHandle,
    args: &[String],
    eval_args: &EvalArgs,
  ) -> anyhow::Result<Vec<Box<dyn Installable>>> {
    Ok(eval.parse_installables(&self.store, args, eval_args.file.as_deref())?)
  }
}
