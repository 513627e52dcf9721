//! Editor invocation for a source position.

use std::path::Path;

use tracing::warn;

use crate::consts::{DEFAULT_EDITOR, EDITOR_ENV};
use crate::eval::Pos;

/// Editors that understand a leading `+<line>` argument.
const LINE_AWARE_EDITORS: &[&str] = &["emacs", "nano", "vim"];

/// Command line that opens `pos` in the user's editor.
///
/// `EDITOR` (default `cat`) is split shell-style; the file always comes last.
pub fn editor_for(pos: &Pos) -> Vec<String> {
  let editor = std::env::var(EDITOR_ENV)
    .ok()
    .filter(|e| !e.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_EDITOR.to_string());

  let mut args = shell_words::split(&editor).unwrap_or_else(|err| {
    warn!(editor = %editor, error = %err, "cannot parse EDITOR, splitting on whitespace");
    editor.split_whitespace().map(String::from).collect()
  });
  if args.is_empty() {
    args.push(DEFAULT_EDITOR.to_string());
  }

  let program = Path::new(&args[0])
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  if pos.line > 0 && LINE_AWARE_EDITORS.iter().any(|e| program.contains(e)) {
    args.push(format!("+{}", pos.line));
  }

  args.push(pos.file.display().to_string());
  args
}
