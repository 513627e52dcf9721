//! `sysp references`: immediate references of one store path.

use anyhow::Result;
use clap::Args;

use sysp_lib::command::resolve_single_path;

use super::Context;
use crate::args::EvalArgs;
use crate::output::print_json;

#[derive(Args, Debug)]
pub struct ReferencesArgs {
  #[command(flatten)]
  eval: EvalArgs,

  /// A store path, `file#attr` or attribute path
  installables: Vec<String>,
}

pub fn cmd_references(ctx: &Context, args: &ReferencesArgs) -> Result<()> {
  let store = ctx.store()?;
  let eval = ctx.eval_handle(&args.eval);
  let installables = ctx.installables(&eval, &args.installables, &args.eval)?;
  let path = resolve_single_path(store.as_ref(), &installables)?;

  let references: Vec<String> = store
    .query_references(&path)?
    .iter()
    .map(|r| store.print_store_path(r))
    .collect();

  if ctx.output.is_json() {
    return print_json(&references);
  }
  for reference in references {
    println!("{}", reference);
  }
  Ok(())
}
