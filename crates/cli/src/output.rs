//! Terminal output.
//!
//! Results meant for scripts (store paths, JSON, stats) go to stdout as-is.
//! Status lines go to stderr behind a colored marker.

use std::time::{Duration, SystemTime};

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const CURRENT: &str = "*";
}

#[derive(Clone, Copy)]
enum Level {
  Success,
  Error,
  Warning,
  Info,
}

impl Level {
  fn marker(self) -> (&'static str, AnsiColors) {
    match self {
      Level::Success => (symbols::SUCCESS, AnsiColors::Green),
      Level::Error => (symbols::ERROR, AnsiColors::Red),
      Level::Warning => (symbols::WARNING, AnsiColors::Yellow),
      Level::Info => (symbols::INFO, AnsiColors::Blue),
    }
  }

  /// Errors and warnings tint the whole line, not just the marker.
  fn tints_message(self) -> bool {
    matches!(self, Level::Error | Level::Warning)
  }
}

fn status(level: Level, message: &str) {
  let (marker, color) = level.marker();
  let marker = marker.if_supports_color(Stream::Stderr, |m| m.color(color));
  if level.tints_message() {
    eprintln!("{marker} {}", message.if_supports_color(Stream::Stderr, |m| m.color(color)));
  } else {
    eprintln!("{marker} {message}");
  }
}

pub fn print_success(message: &str) {
  status(Level::Success, message);
}

pub fn print_error(message: &str) {
  status(Level::Error, message);
}

pub fn print_warning(message: &str) {
  status(Level::Warning, message);
}

pub fn print_info(message: &str) {
  status(Level::Info, message);
}

/// One `label: value` line of a summary.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {value}", label.if_supports_color(Stream::Stdout, |l| l.dimmed()));
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let rendered = serde_json::to_string_pretty(value).context("cannot render JSON output")?;
  println!("{rendered}");
  Ok(())
}

/// Binary-prefixed size with one decimal, e.g. `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
  const UNITS: [&str; 3] = ["KB", "MB", "GB"];

  if bytes < 1024 {
    return format!("{bytes} B");
  }
  let mut scaled = bytes as f64 / 1024.0;
  let mut unit = 0;
  while scaled >= 1024.0 && unit + 1 < UNITS.len() {
    scaled /= 1024.0;
    unit += 1;
  }
  format!("{scaled:.1} {}", UNITS[unit])
}

/// Registration timestamps are seconds since the epoch.
pub fn format_timestamp(secs: u64) -> String {
  humantime::format_rfc3339_seconds(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)).to_string()
}
