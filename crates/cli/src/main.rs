use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sysp_lib::command::CommandError;
use sysp_lib::settings::Settings;

use crate::cmd::Context;
use crate::output::{OutputFormat, print_error};

mod args;
mod cmd;
mod output;

/// sysp - inspect, copy, build and install store paths
#[derive(Parser)]
#[command(name = "sysp")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Store to use (`auto`, `local?root=DIR`, an absolute directory or `dummy://`)
  #[arg(long, global = true, value_name = "URI")]
  store: Option<String>,

  /// Add an entry (`name=path` or `path`) to the expression search path
  #[arg(short = 'I', long = "include", global = true, value_name = "ENTRY")]
  include: Vec<String>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Query information about store paths
  PathInfo(cmd::path_info::PathInfoArgs),

  /// Copy paths between stores
  Copy(cmd::copy::CopyArgs),

  /// Print the immediate references of a store path
  References(cmd::references::ReferencesArgs),

  /// Build (realise) installables and print their outputs
  Build(cmd::build::BuildArgs),

  /// Build installables and add the result to a profile
  Install(cmd::install::InstallArgs),

  /// Run a command with the outputs of installables on PATH
  Run(cmd::run::RunArgs),

  /// Open the definition of an installable in $EDITOR
  Edit(cmd::edit::EditArgs),

  /// Add a file or directory to the store
  Add(cmd::add::AddArgs),

  /// List the generations of a profile
  Generations(cmd::generations::GenerationsArgs),
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .with_writer(std::io::stderr)
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let settings = Settings::from_env();
  let ctx = Context::new(settings, cli.store, &cli.include, cli.output);

  let result = match cli.command {
    Commands::PathInfo(args) => cmd::path_info::cmd_path_info(&ctx, &args).map(|()| ExitCode::SUCCESS),
    Commands::Copy(args) => cmd::copy::cmd_copy(&ctx, &args).map(|()| ExitCode::SUCCESS),
    Commands::References(args) => cmd::references::cmd_references(&ctx, &args).map(|()| ExitCode::SUCCESS),
    Commands::Build(args) => cmd::build::cmd_build(&ctx, &args).map(|()| ExitCode::SUCCESS),
    Commands::Install(args) => cmd::install::cmd_install(&ctx, &args).map(|()| ExitCode::SUCCESS),
    Commands::Run(args) => cmd::run::cmd_run(&ctx, &args),
    Commands::Edit(args) => cmd::edit::cmd_edit(&ctx, &args),
    Commands::Add(args) => cmd::add::cmd_add(&ctx, &args).map(|()| ExitCode::SUCCESS),
    Commands::Generations(args) => cmd::generations::cmd_generations(&ctx, &args).map(|()| ExitCode::SUCCESS),
  };

  match result {
    Ok(code) => code,
    Err(err) => {
      let usage = err
        .chain()
        .find_map(|e| e.downcast_ref::<CommandError>())
        .filter(|e| e.is_usage());
      match usage {
        Some(usage) => {
          print_error(&usage.to_string());
          ExitCode::from(2)
        }
        None => {
          print_error(&format!("{:#}", err));
          ExitCode::FAILURE
        }
      }
    }
  }
}
