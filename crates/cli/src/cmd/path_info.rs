//! `sysp path-info`: registration details of store paths.

use std::collections::BTreeSet;

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;

use sysp_lib::installable::Realise;
use sysp_lib::store::Store;

use super::Context;
use crate::args::{AllArgs, DirectByDefault, EvalArgs, OperateOnArgs, store_paths_options};
use crate::output::{format_bytes, print_json};

#[derive(Args, Debug)]
pub struct PathInfoArgs {
  #[command(flatten)]
  eval: EvalArgs,

  #[command(flatten)]
  recursive: DirectByDefault,

  #[command(flatten)]
  all: AllArgs,

  #[command(flatten)]
  operate_on: OperateOnArgs,

  /// Print the size of each path
  #[arg(short = 's', long)]
  size: bool,

  /// Print the size of the closure of each path
  #[arg(short = 'S', long)]
  closure_size: bool,

  /// Print JSON (same as `--output json`)
  #[arg(long)]
  json: bool,

  /// Store paths, `file#attr` or attribute paths
  installables: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PathInfoJson {
  path: String,
  nar_hash: String,
  nar_size: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  closure_size: Option<u64>,
  references: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  deriver: Option<String>,
  registration_time: u64,
}

fn closure_size(store: &dyn Store, path: &sysp_lib::store::StorePath) -> Result<u64> {
  let mut closure = BTreeSet::new();
  store.compute_fs_closure(&BTreeSet::from([path.clone()]), &mut closure)?;
  let mut total = 0;
  for member in &closure {
    total += store.query_path_info(member)?.nar_size;
  }
  Ok(total)
}

pub fn cmd_path_info(ctx: &Context, args: &PathInfoArgs) -> Result<()> {
  let options = store_paths_options(
    &args.all,
    args.recursive.recursive(),
    Realise::Nothing,
    args.operate_on.operate_on(),
  );
  options.check_arguments(args.installables.len())?;

  let store = ctx.store()?;
  let eval = ctx.eval_handle(&args.eval);
  let installables = ctx.installables(&eval, &args.installables, &args.eval)?;
  let paths = options.resolve_store_paths(store.as_ref(), &installables)?;

  if args.json || ctx.output.is_json() {
    let mut entries = Vec::with_capacity(paths.len());
    for path in &paths {
      let info = store
        .query_path_info(path)
        .with_context(|| format!("Failed to query {}", store.print_store_path(path)))?;
      entries.push(PathInfoJson {
        path: store.print_store_path(path),
        nar_hash: info.nar_hash,
        nar_size: info.nar_size,
        closure_size: if args.closure_size {
          Some(closure_size(store.as_ref(), path)?)
        } else {
          None
        },
        references: info.references.iter().map(|r| store.print_store_path(r)).collect(),
        deriver: info.deriver.as_ref().map(|d| store.print_store_path(d)),
        registration_time: info.registration_time,
      });
    }
    return print_json(&entries);
  }

  let width = paths.iter().map(|p| store.print_store_path(p).len()).max().unwrap_or(0);
  for path in &paths {
    let printed = store.print_store_path(path);
    let info = store
      .query_path_info(path)
      .with_context(|| format!("Failed to query {}", printed))?;
    if !args.size && !args.closure_size {
      println!("{}", printed);
      continue;
    }

    let mut line = format!("{:<width$}", printed, width = width);
    if args.size {
      line.push_str(&format!("\t{:>9}", format_bytes(info.nar_size)));
    }
    if args.closure_size {
      line.push_str(&format!("\t{:>9}", format_bytes(closure_size(store.as_ref(), path)?)));
    }
    println!("{}", line);
  }

  Ok(())
}
