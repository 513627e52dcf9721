//! `sysp edit`: open the definition of an installable in the user's editor.

use std::process::{Command, ExitCode};

use anyhow::{Context as _, Result, bail};
use clap::Args;
use tracing::debug;

use sysp_lib::command::editor_for;

use super::Context;
use super::run::exit_code;
use crate::args::EvalArgs;

#[derive(Args, Debug)]
pub struct EditArgs {
  #[command(flatten)]
  eval: EvalArgs,

  /// `file#attr` or attribute path whose definition to open
  installable: String,
}

pub fn cmd_edit(ctx: &Context, args: &EditArgs) -> Result<ExitCode> {
  let eval = ctx.eval_handle(&args.eval);
  let installables = ctx.installables(&eval, std::slice::from_ref(&args.installable), &args.eval)?;
  let Some(installable) = installables.first() else {
    bail!("no installable given");
  };

  let pos = installable.position()?;
  let argv = editor_for(&pos);
  debug!(argv = ?argv, "starting editor");

  let Some((program, rest)) = argv.split_first() else {
    bail!("empty editor command");
  };
  let status = Command::new(program)
    .args(rest)
    .status()
    .with_context(|| format!("Failed to start editor '{}'", program))?;
  Ok(exit_code(status))
}
