//! `sysp add`: copy a file or directory into the store.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use sysp_lib::command::CommandError;

use super::Context;
use crate::output::print_json;

#[derive(Args, Debug)]
pub struct AddArgs {
  /// Name of the store object (default: the file name of PATH)
  #[arg(long)]
  name: Option<String>,

  /// Store path the new object refers to (may be repeated)
  #[arg(long = "reference", value_name = "PATH")]
  references: Vec<PathBuf>,

  /// File or directory to add
  path: PathBuf,
}

pub fn cmd_add(ctx: &Context, args: &AddArgs) -> Result<()> {
  let store = ctx.store()?;
  let local = store
    .as_local_fs()
    .ok_or_else(|| CommandError::Unsupported(format!("store '{}' does not support adding paths", store.uri())))?;

  let name = match &args.name {
    Some(name) => name.clone(),
    None => dunce::canonicalize(&args.path)
      .with_context(|| format!("Failed to resolve {}", args.path.display()))?
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .with_context(|| format!("{} has no file name, use --name", args.path.display()))?,
  };

  let mut references = BTreeSet::new();
  for reference in &args.references {
    references.insert(store.follow_links_to_store_path(reference)?);
  }

  let path = local
    .add_to_store(&args.path, &name, &references)
    .with_context(|| format!("Failed to add {}", args.path.display()))?;

  let printed = store.print_store_path(&path);
  if ctx.output.is_json() {
    return print_json(&printed);
  }
  println!("{}", printed);
  Ok(())
}
