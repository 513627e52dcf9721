//! `sysp run`: run a command with the outputs of installables on `PATH`.

use std::path::PathBuf;
use std::process::{Command, ExitCode, ExitStatus};

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::debug;

use sysp_lib::installable::{OperateOn, Realise, to_store_paths};

use super::Context;
use crate::args::{EnvironmentArgs, EvalArgs};

const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Args, Debug)]
pub struct RunArgs {
  #[command(flatten)]
  eval: EvalArgs,

  #[command(flatten)]
  env: EnvironmentArgs,

  /// Command and arguments to run (default: $SHELL)
  #[arg(short = 'c', long = "command", num_args = 1.., allow_hyphen_values = true, value_name = "COMMAND")]
  command: Vec<String>,

  /// Store paths, `file#attr` or attribute paths
  installables: Vec<String>,
}

pub(crate) fn exit_code(status: ExitStatus) -> ExitCode {
  match status.code() {
    Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
    None => ExitCode::FAILURE,
  }
}

pub fn cmd_run(ctx: &Context, args: &RunArgs) -> Result<ExitCode> {
  let mut env = args.env.control().activate()?;

  let store = ctx.store()?;
  let eval = ctx.eval_handle(&args.eval);
  let installables = ctx.installables(&eval, &args.installables, &args.eval)?;
  let outputs = to_store_paths(store.as_ref(), Realise::Outputs, OperateOn::Output, &installables)?;

  let mut path: Vec<PathBuf> = outputs
    .iter()
    .map(|p| PathBuf::from(store.print_store_path(p)).join("bin"))
    .collect();
  if let Some(existing) = env.get("PATH") {
    path.extend(std::env::split_paths(existing));
  }
  env.set("PATH", std::env::join_paths(path).context("Output path cannot be put on PATH")?);

  let (program, program_args) = match args.command.split_first() {
    Some((program, rest)) => (program.clone(), rest),
    None => (
      env
        .get("SHELL")
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string()),
      &[][..],
    ),
  };

  debug!(program = %program, args = ?program_args, "running");
  let status = env
    .apply(&mut Command::new(&program))
    .args(program_args)
    .status()
    .with_context(|| format!("Failed to run '{}'", program))?;
  Ok(exit_code(status))
}
