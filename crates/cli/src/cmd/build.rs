//! `sysp build`: realise installables and print their outputs.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;

use sysp_lib::consts::DEFAULT_OUTPUT;
use sysp_lib::installable::{Buildable, Realise, build};
use sysp_lib::store::Store;

use super::Context;
use crate::args::{EvalArgs, ProfileArgs};
use crate::output::{print_json, print_warning};

#[derive(Args, Debug)]
pub struct BuildArgs {
  #[command(flatten)]
  eval: EvalArgs,

  #[command(flatten)]
  profile: ProfileArgs,

  /// Create result symlinks with this prefix (`<prefix>`, `<prefix>-dev`, `<prefix>-1`…)
  #[arg(long, value_name = "PATH")]
  out_link: Option<PathBuf>,

  /// Store paths, `file#attr` or attribute paths
  installables: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BuildableJson {
  #[serde(skip_serializing_if = "Option::is_none")]
  drv_path: Option<String>,
  outputs: std::collections::BTreeMap<String, String>,
}

pub(crate) fn buildables_json(store: &dyn Store, buildables: &[Buildable]) -> Vec<BuildableJson> {
  buildables
    .iter()
    .map(|b| BuildableJson {
      drv_path: b.drv_path.as_ref().map(|d| store.print_store_path(d)),
      outputs: b
        .outputs
        .iter()
        .map(|(name, path)| (name.clone(), store.print_store_path(path)))
        .collect(),
    })
    .collect()
}

/// Result link name for output `output` of the `index`th buildable.
fn out_link_name(prefix: &Path, index: usize, output: &str) -> PathBuf {
  let mut name = prefix.as_os_str().to_os_string();
  if index > 0 {
    name.push(format!("-{}", index));
  }
  if output != DEFAULT_OUTPUT {
    name.push(format!("-{}", output));
  }
  PathBuf::from(name)
}

fn create_out_links(store: &dyn Store, prefix: &Path, buildables: &[Buildable]) -> Result<()> {
  let Some(local) = store.as_local_fs() else {
    print_warning(&format!("store '{}' cannot hold result links, skipping", store.uri()));
    return Ok(());
  };
  for (index, buildable) in buildables.iter().enumerate() {
    for (output, path) in &buildable.outputs {
      let link = out_link_name(prefix, index, output);
      local
        .add_perm_root(path, &link)
        .with_context(|| format!("Failed to create result link {}", link.display()))?;
    }
  }
  Ok(())
}

pub fn cmd_build(ctx: &Context, args: &BuildArgs) -> Result<()> {
  let store = ctx.store()?;
  let eval = ctx.eval_handle(&args.eval);
  let installables = ctx.installables(&eval, &args.installables, &args.eval)?;

  let buildables = build(store.as_ref(), Realise::Outputs, &installables)?;

  if let Some(prefix) = &args.out_link {
    create_out_links(store.as_ref(), prefix, &buildables)?;
  }
  args
    .profile
    .updater()
    .update_profile_from_buildables(store.as_ref(), &buildables)?;

  if ctx.output.is_json() {
    return print_json(&buildables_json(store.as_ref(), &buildables));
  }
  for buildable in &buildables {
    for path in buildable.outputs.values() {
      println!("{}", store.print_store_path(path));
    }
  }
  Ok(())
}
