//! Expression evaluation.
//!
//! Expressions are Lua files that return (possibly nested) tables of
//! packages. `EvalState` owns the Lua runtime, the search path used for
//! `<name>` lookups and a handle to the store. It also owns the single
//! failure-hook slot: when evaluation fails, the hook (if registered) sees
//! the error and the variable bindings of the innermost scope before the error
//! propagates.

pub mod pos;
pub mod repl;
pub mod search_path;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use tracing::debug;

use crate::store::Store;

pub use pos::Pos;
pub use search_path::{SearchPath, SearchPathEntry};

/// Variable name → value, as visible where evaluation failed.
pub type Bindings = BTreeMap<String, LuaValue>;

/// Invoked on evaluation failure with the evaluator, the error and the bindings in scope.
pub type DebugHook = Box<dyn Fn(&EvalState, &EvalError, &Bindings)>;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
  #[error("lua error: {0}")]
  Lua(#[from] LuaError),

  #[error("cannot read expression file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("file '{0}' was not found in the search path")]
  NotInSearchPath(String),

  #[error("attribute '{attr}' missing in '{context}'")]
  MissingAttribute { attr: String, context: String },

  #[error("'{context}' is a {kind}, cannot select attribute '{attr}'")]
  NotSelectable {
    attr: String,
    context: String,
    kind: &'static str,
  },
}

pub struct EvalState {
  lua: Lua,
  search_path: SearchPath,
  store: Rc<dyn Store>,
  debug_hook: Option<DebugHook>,
}

impl std::fmt::Debug for EvalState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EvalState")
      .field("search_path", &self.search_path)
      .field("store", &self.store.uri())
      .field("debug_hook", &self.debug_hook.is_some())
      .finish()
  }
}

impl EvalState {
  /// Create an evaluator with the `sysp` global table registered.
  pub fn new(search_path: SearchPath, store: Rc<dyn Store>) -> Result<Self, EvalError> {
    let lua = Lua::new();
    register_globals(&lua, &search_path, store.as_ref())?;
    Ok(Self {
      lua,
      search_path,
      store,
      debug_hook: None,
    })
  }

  pub fn lua(&self) -> &Lua {
    &self.lua
  }

  pub fn store(&self) -> &Rc<dyn Store> {
    &self.store
  }

  pub fn search_path(&self) -> &SearchPath {
    &self.search_path
  }

  /// Install the failure hook, returning the one it replaces.
  pub fn set_debug_hook(&mut self, hook: DebugHook) -> Option<DebugHook> {
    self.debug_hook.replace(hook)
  }

  pub fn has_debug_hook(&self) -> bool {
    self.debug_hook.is_some()
  }

  /// Resolve an expression file argument; `<name>` goes through the search path.
  pub fn resolve_expr_path(&self, file: &str) -> Result<PathBuf, EvalError> {
    match file.strip_prefix('<').and_then(|f| f.strip_suffix('>')) {
      Some(name) => self
        .search_path
        .find_file(name)
        .ok_or_else(|| EvalError::NotInSearchPath(name.to_string())),
      None => Ok(PathBuf::from(file)),
    }
  }

  /// Evaluate a Lua file in its own environment.
  ///
  /// Global assignments made by the file land in that environment (reads fall
  /// through to `_G`), so they are the bindings reported on failure.
  pub fn eval_file(&self, path: &Path) -> Result<LuaValue, EvalError> {
    self.eval_file_scoped(path).map(|(value, _)| value)
  }

  /// `eval_file`, also returning the bindings the file left in its environment.
  fn eval_file_scoped(&self, path: &Path) -> Result<(LuaValue, Bindings), EvalError> {
    let canonical = dunce::canonicalize(path).map_err(|source| EvalError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let content = std::fs::read_to_string(&canonical).map_err(|source| EvalError::Read {
      path: canonical.clone(),
      source,
    })?;

    let env = self.file_env(&canonical)?;
    debug!(path = %canonical.display(), "evaluating file");

    let value = self
      .lua
      .load(&content)
      .set_name(format!("@{}", canonical.display()))
      .set_environment(env.clone())
      .eval::<LuaValue>();
    let bindings = table_bindings(&env);
    match value {
      Ok(value) => Ok((value, bindings)),
      Err(e) => Err(self.fail(e.into(), &bindings)),
    }
  }

  /// Evaluate `file` and select the dotted `attr_path` from the result.
  ///
  /// Functions met along the way (including the final value) are called with
  /// no arguments first. An empty attribute path selects the file's value.
  pub fn eval_attr(&self, file: &Path, attr_path: &str) -> Result<LuaValue, EvalError> {
    let (mut value, mut scope) = self.eval_file_scoped(file)?;
    let mut context = file.display().to_string();

    for attr in attr_path.split('.').filter(|a| !a.is_empty()) {
      value = self.auto_call(value).map_err(|e| self.fail(e, &scope))?;
      let table = match value {
        LuaValue::Table(table) => table,
        other => {
          let err = EvalError::NotSelectable {
            attr: attr.to_string(),
            context,
            kind: other.type_name(),
          };
          return Err(self.fail(err, &scope));
        }
      };

      scope = table_bindings(&table);
      let next: LuaValue = table.get(attr).map_err(|e| self.fail(e.into(), &scope))?;
      if next.is_nil() {
        let err = EvalError::MissingAttribute {
          attr: attr.to_string(),
          context,
        };
        return Err(self.fail(err, &scope));
      }

      context = if context.contains('#') {
        format!("{}.{}", context, attr)
      } else {
        format!("{}#{}", context, attr)
      };
      value = next;
    }

    self.auto_call(value).map_err(|e| self.fail(e, &scope))
  }

  /// Evaluate an expression (or statement) with `bindings` in scope.
  ///
  /// Never invokes the failure hook.
  pub fn eval_expr(&self, expr: &str, bindings: &Bindings) -> Result<LuaValue, EvalError> {
    let env = self.lua.create_table()?;
    for (name, value) in bindings {
      env.set(name.as_str(), value.clone())?;
    }
    let mt = self.lua.create_table()?;
    mt.set("__index", self.lua.globals())?;
    env.set_metatable(Some(mt))?;

    let as_expression = self
      .lua
      .load(format!("return {}", expr))
      .set_name("=repl")
      .set_environment(env.clone())
      .eval::<LuaValue>();

    match as_expression {
      Err(LuaError::SyntaxError { .. }) => Ok(
        self
          .lua
          .load(expr)
          .set_name("=repl")
          .set_environment(env)
          .eval::<LuaValue>()?,
      ),
      other => Ok(other?),
    }
  }

  fn file_env(&self, path: &Path) -> Result<LuaTable, EvalError> {
    let env = self.lua.create_table()?;
    let dir = path.parent().unwrap_or(Path::new(".")).to_string_lossy().into_owned();
    env.set("__dir", dir)?;

    let mt = self.lua.create_table()?;
    mt.set("__index", self.lua.globals())?;
    env.set_metatable(Some(mt))?;
    Ok(env)
  }

  fn auto_call(&self, value: LuaValue) -> Result<LuaValue, EvalError> {
    match value {
      LuaValue::Function(f) => Ok(f.call::<LuaValue>(())?),
      other => Ok(other),
    }
  }

  /// Run the failure hook, if any, and hand the error back.
  fn fail(&self, err: EvalError, bindings: &Bindings) -> EvalError {
    if let Some(hook) = &self.debug_hook {
      hook(self, &err, bindings);
    }
    err
  }
}

/// String-keyed entries of `table`, skipping the injected `__dir`.
pub fn table_bindings(table: &LuaTable) -> Bindings {
  let mut bindings = Bindings::new();
  for (key, value) in table.pairs::<LuaValue, LuaValue>().flatten() {
    if let LuaValue::String(key) = key {
      let key = key.to_string_lossy();
      if key != "__dir" {
        bindings.insert(key, value);
      }
    }
  }
  bindings
}

fn register_globals(lua: &Lua, search_path: &SearchPath, store: &dyn Store) -> LuaResult<()> {
  let sysp = lua.create_table()?;
  sysp.set("store_dir", store.store_dir().to_string_lossy().into_owned())?;

  let lookup = search_path.clone();
  let find_file = lua.create_function(move |_, name: String| {
    lookup
      .find_file(&name)
      .map(|p| p.to_string_lossy().into_owned())
      .ok_or_else(|| LuaError::external(format!("file '{}' was not found in the search path", name)))
  })?;
  sysp.set("find_file", find_file)?;

  lua.globals().set("sysp", sysp)?;
  Ok(())
}
