//! `sysp install`: build installables into the default (or given) profile.

use anyhow::Result;
use clap::Args;

use sysp_lib::installable::{Realise, build};

use super::Context;
use crate::args::{EvalArgs, ProfileArgs};
use crate::cmd::build::buildables_json;
use crate::output::{print_json, print_success, symbols};

#[derive(Args, Debug)]
pub struct InstallArgs {
  #[command(flatten)]
  eval: EvalArgs,

  #[command(flatten)]
  profile: ProfileArgs,

  /// Store path, `file#attr` or attribute path producing a single output
  installables: Vec<String>,
}

pub fn cmd_install(ctx: &Context, args: &InstallArgs) -> Result<()> {
  let store = ctx.store()?;
  let eval = ctx.eval_handle(&args.eval);
  let installables = ctx.installables(&eval, &args.installables, &args.eval)?;

  let buildables = build(store.as_ref(), Realise::Outputs, &installables)?;
  let updater = args.profile.updater_with_default(ctx.settings.default_profile.clone());
  updater.update_profile_from_buildables(store.as_ref(), &buildables)?;

  if ctx.output.is_json() {
    return print_json(&buildables_json(store.as_ref(), &buildables));
  }
  if let Some(profile) = updater.profile() {
    for path in buildables.iter().flat_map(|b| b.outputs.values()) {
      print_success(&format!(
        "{} {} {}",
        store.print_store_path(path),
        symbols::ARROW,
        profile.display()
      ));
    }
  }
  Ok(())
}
