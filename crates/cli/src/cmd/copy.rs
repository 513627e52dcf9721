//! `sysp copy`: copy paths (by default with their closure) to another store.

use anyhow::{Context as _, Result};
use clap::Args;

use sysp_lib::installable::{OperateOn, Realise};
use sysp_lib::store::{copy_paths, open_store};

use super::Context;
use crate::args::{AllArgs, EvalArgs, RecursiveByDefault, store_paths_options};
use crate::output::{print_json, print_stat, print_success};

#[derive(Args, Debug)]
pub struct CopyArgs {
  #[command(flatten)]
  eval: EvalArgs,

  #[command(flatten)]
  recursive: RecursiveByDefault,

  #[command(flatten)]
  all: AllArgs,

  /// URI of the destination store
  #[arg(long, value_name = "URI")]
  to: String,

  /// Store paths, `file#attr` or attribute paths
  installables: Vec<String>,
}

pub fn cmd_copy(ctx: &Context, args: &CopyArgs) -> Result<()> {
  let options = store_paths_options(&args.all, args.recursive.recursive(), Realise::Outputs, OperateOn::Output);
  options.check_arguments(args.installables.len())?;

  let src = ctx.store()?;
  let dst = open_store(&args.to, &ctx.settings.store_root).with_context(|| format!("Failed to open store '{}'", args.to))?;

  let eval = ctx.eval_handle(&args.eval);
  let installables = ctx.installables(&eval, &args.installables, &args.eval)?;
  let paths = options.resolve_store_paths(src.as_ref(), &installables)?;

  let copied = copy_paths(src.as_ref(), dst.as_ref(), &paths)
    .with_context(|| format!("Failed to copy to '{}'", args.to))?;

  if ctx.output.is_json() {
    let printed: Vec<String> = copied.iter().map(|p| dst.print_store_path(p)).collect();
    return print_json(&printed);
  }

  print_success(&format!("Copied to {}", dst.uri()));
  print_stat("Paths copied", &copied.len().to_string());
  print_stat("Already present", &paths.len().saturating_sub(copied.len()).to_string());
  Ok(())
}
