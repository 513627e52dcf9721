//! `sysp generations`: list the generations of a profile.

use anyhow::{Context as _, Result};
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use sysp_lib::profile::generations;

use super::Context;
use crate::args::ProfileArgs;
use crate::output::{format_timestamp, print_info, print_json, symbols};

#[derive(Args, Debug)]
pub struct GenerationsArgs {
  #[command(flatten)]
  profile: ProfileArgs,
}

#[derive(Debug, Serialize)]
struct GenerationJson {
  number: u64,
  path: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  target: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  created: Option<u64>,
  current: bool,
}

pub fn cmd_generations(ctx: &Context, args: &GenerationsArgs) -> Result<()> {
  let updater = args.profile.updater_with_default(ctx.settings.default_profile.clone());
  let Some(profile) = updater.profile() else {
    return Ok(());
  };
  let store = ctx.store()?;

  let generations =
    generations(profile).with_context(|| format!("Failed to list generations of {}", profile.display()))?;

  let entries: Vec<GenerationJson> = generations
    .iter()
    .map(|g| GenerationJson {
      number: g.number,
      path: g.path.display().to_string(),
      target: store
        .follow_links_to_store_path(&g.path)
        .ok()
        .map(|p| store.print_store_path(&p)),
      created: g
        .creation_time
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs()),
      current: g.current,
    })
    .collect();

  if ctx.output.is_json() {
    return print_json(&entries);
  }
  if entries.is_empty() {
    print_info(&format!("No generations in {}", profile.display()));
    return Ok(());
  }

  for entry in &entries {
    let marker = if entry.current { symbols::CURRENT } else { " " };
    println!(
      "{} {:>4}   {}   {}",
      marker.if_supports_color(Stream::Stdout, |s| s.green()),
      entry.number,
      entry.created.map(format_timestamp).unwrap_or_else(|| "-".to_string()),
      entry.target.as_deref().unwrap_or("(dangling)")
    );
  }
  Ok(())
}
