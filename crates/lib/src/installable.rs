//! Installables: user-supplied references that resolve to store outputs.
//!
//! An argument is one of
//! - a path that leads into the store (directly or through symlinks such as
//!   profiles), e.g. `/…/store/<hash>-hello` or `~/.local/share/sysp/profiles/default`
//! - `file#attr.path`, an attribute of an expression file (`<name>` files are
//!   looked up in the search path)
//! - a bare `attr.path`, selected from the default expression file

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{DEFAULT_EXPR_ENTRY, DEFAULT_EXPR_FILE, DEFAULT_OUTPUT};
use crate::eval::{EvalError, EvalState, Pos};
use crate::store::{Store, StoreError, StorePath};

/// How far resolution goes towards making outputs exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Realise {
  /// Build (here: require) the outputs.
  Outputs,
  /// Only make sure derivations are present.
  #[default]
  Derivation,
  /// Compute paths only; report what is missing.
  Nothing,
}

/// Whether commands act on outputs or on the derivations that produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperateOn {
  #[default]
  Output,
  Derivation,
}

/// The outputs of one package, keyed by output name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Buildable {
  pub drv_path: Option<StorePath>,
  pub outputs: BTreeMap<String, StorePath>,
}

impl Buildable {
  pub fn single(path: StorePath) -> Self {
    Self {
      drv_path: None,
      outputs: BTreeMap::from([(DEFAULT_OUTPUT.to_string(), path)]),
    }
  }
}

#[derive(Debug, Error)]
pub enum InstallableError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Eval(#[from] EvalError),

  #[error("'{installable}' does not evaluate to a package: {reason}")]
  NotAPackage { installable: String, reason: String },

  #[error("'{0}' does not have a source position")]
  NoPosition(String),
}

pub trait Installable {
  /// Human-readable form, as given on the command line.
  fn what(&self) -> String;

  fn to_buildables(&self) -> Result<Vec<Buildable>, InstallableError>;

  /// Where the installable is defined, if that is known.
  fn position(&self) -> Result<Pos, InstallableError> {
    Err(InstallableError::NoPosition(self.what()))
  }
}

/// A store path given directly (or through symlinks).
pub struct InstallableStorePath {
  store: Rc<dyn Store>,
  path: StorePath,
}

impl InstallableStorePath {
  pub fn new(store: Rc<dyn Store>, path: StorePath) -> Self {
    Self { store, path }
  }
}

impl Installable for InstallableStorePath {
  fn what(&self) -> String {
    self.store.print_store_path(&self.path)
  }

  fn to_buildables(&self) -> Result<Vec<Buildable>, InstallableError> {
    let drv_path = if self.path.is_derivation() {
      Some(self.path.clone())
    } else if self.store.is_valid_path(&self.path)? {
      self.store.query_deriver(&self.path)?
    } else {
      None
    };

    Ok(vec![Buildable {
      drv_path,
      ..Buildable::single(self.path.clone())
    }])
  }
}

/// An attribute of an expression file.
pub struct InstallableAttrPath {
  state: Rc<EvalState>,
  file: PathBuf,
  attr_path: String,
}

impl InstallableAttrPath {
  pub fn new(state: Rc<EvalState>, file: PathBuf, attr_path: impl Into<String>) -> Self {
    Self {
      state,
      file,
      attr_path: attr_path.into(),
    }
  }

  fn eval(&self) -> Result<LuaValue, InstallableError> {
    Ok(self.state.eval_attr(&self.file, &self.attr_path)?)
  }
}

impl Installable for InstallableAttrPath {
  fn what(&self) -> String {
    format!("{}#{}", self.file.display(), self.attr_path)
  }

  fn to_buildables(&self) -> Result<Vec<Buildable>, InstallableError> {
    let value = self.eval()?;
    let mut buildables = Vec::new();
    value_to_buildables(self.state.store().as_ref(), &self.what(), &value, &mut buildables)?;
    Ok(buildables)
  }

  fn position(&self) -> Result<Pos, InstallableError> {
    let position = match self.eval()? {
      LuaValue::Table(table) => table
        .get::<Option<LuaTable>>("meta")
        .map_err(EvalError::from)?
        .map(|meta| meta.get::<Option<String>>("position"))
        .transpose()
        .map_err(EvalError::from)?
        .flatten(),
      _ => None,
    };

    position
      .map(|p| Pos::parse(&p))
      .ok_or_else(|| InstallableError::NoPosition(self.what()))
  }
}

fn value_to_buildables(
  store: &dyn Store,
  what: &str,
  value: &LuaValue,
  out: &mut Vec<Buildable>,
) -> Result<(), InstallableError> {
  let not_a_package = |reason: String| InstallableError::NotAPackage {
    installable: what.to_string(),
    reason,
  };
  let parse_path = |s: &LuaString| -> Result<StorePath, InstallableError> {
    Ok(store.parse_store_path(Path::new(&s.to_string_lossy()))?)
  };

  match value {
    LuaValue::String(s) => out.push(Buildable::single(parse_path(s)?)),
    LuaValue::Table(table) => {
      let outputs: Option<LuaTable> = table.get("outputs").map_err(EvalError::from)?;
      match outputs {
        Some(outputs) => {
          let mut buildable = Buildable::default();
          for pair in outputs.pairs::<String, LuaString>() {
            let (name, path) = pair.map_err(EvalError::from)?;
            buildable.outputs.insert(name, parse_path(&path)?);
          }
          if buildable.outputs.is_empty() {
            return Err(not_a_package("'outputs' is empty".to_string()));
          }
          let drv_path: Option<LuaString> = table.get("drv_path").map_err(EvalError::from)?;
          buildable.drv_path = drv_path.map(|p| parse_path(&p)).transpose()?;
          out.push(buildable);
        }
        None if table.raw_len() > 0 => {
          for element in table.sequence_values::<LuaValue>() {
            let element = element.map_err(EvalError::from)?;
            value_to_buildables(store, what, &element, out)?;
          }
        }
        None => return Err(not_a_package("table has no 'outputs'".to_string())),
      }
    }
    other => return Err(not_a_package(format!("value is a {}", other.type_name()))),
  }
  Ok(())
}

/// Pick the expression file for attribute paths.
///
/// `--file` wins; otherwise the `default` search path entry, otherwise
/// `./default.lua`. Directories resolve to their `default.lua`.
pub fn expr_file(state: &EvalState, file: Option<&str>) -> Result<PathBuf, InstallableError> {
  let path = match file {
    Some(file) => state.resolve_expr_path(file)?,
    None => state
      .search_path()
      .find_file(DEFAULT_EXPR_ENTRY)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPR_FILE)),
  };
  Ok(if path.is_dir() {
    path.join(DEFAULT_EXPR_FILE)
  } else {
    path
  })
}

/// Turn command-line arguments into installables.
///
/// `eval_state` is only called when an argument needs the evaluator.
pub fn parse_installables(
  store: &Rc<dyn Store>,
  args: &[String],
  file: Option<&str>,
  eval_state: &dyn Fn() -> Result<Rc<EvalState>, InstallableError>,
) -> Result<Vec<Box<dyn Installable>>, InstallableError> {
  let mut installables: Vec<Box<dyn Installable>> = Vec::with_capacity(args.len());

  for arg in args {
    if let Some((expr, attr_path)) = arg.split_once('#') {
      let state = eval_state()?;
      let path = if expr.is_empty() {
        expr_file(&state, file)?
      } else {
        expr_file(&state, Some(expr))?
      };
      installables.push(Box::new(InstallableAttrPath::new(state, path, attr_path)));
    } else if arg.contains('/') {
      let path = store.follow_links_to_store_path(Path::new(arg))?;
      installables.push(Box::new(InstallableStorePath::new(store.clone(), path)));
    } else {
      let state = eval_state()?;
      let path = expr_file(&state, file)?;
      installables.push(Box::new(InstallableAttrPath::new(state, path, arg.as_str())));
    }
  }

  Ok(installables)
}

/// Resolve installables to buildables, realising according to `mode`.
pub fn build(
  store: &dyn Store,
  mode: Realise,
  installables: &[Box<dyn Installable>],
) -> Result<Vec<Buildable>, InstallableError> {
  let mut buildables = Vec::new();
  let mut wanted = Vec::new();

  for installable in installables {
    for buildable in installable.to_buildables()? {
      match mode {
        Realise::Outputs => wanted.extend(buildable.outputs.values().cloned()),
        Realise::Derivation => wanted.extend(buildable.drv_path.iter().cloned()),
        Realise::Nothing => {
          wanted.extend(buildable.drv_path.iter().cloned());
          wanted.extend(buildable.outputs.values().cloned());
        }
      }
      buildables.push(buildable);
    }
  }

  if mode == Realise::Nothing {
    let missing = store.query_missing(&wanted)?;
    if !missing.is_empty() {
      info!(count = missing.len(), "paths would have to be built or fetched");
      for path in &missing {
        debug!(path = %store.print_store_path(path), "missing");
      }
    }
  } else {
    store.build_paths(&wanted)?;
  }

  Ok(buildables)
}

/// Resolve installables to a flat, ordered list of store paths.
///
/// Duplicates are kept.
pub fn to_store_paths(
  store: &dyn Store,
  mode: Realise,
  operate_on: OperateOn,
  installables: &[Box<dyn Installable>],
) -> Result<Vec<StorePath>, InstallableError> {
  let mut paths = Vec::new();

  match operate_on {
    OperateOn::Output => {
      for buildable in build(store, mode, installables)? {
        paths.extend(buildable.outputs.into_values());
      }
    }
    OperateOn::Derivation => {
      for installable in installables {
        for buildable in installable.to_buildables()? {
          paths.extend(buildable.drv_path);
        }
      }
    }
  }

  Ok(paths)
}
