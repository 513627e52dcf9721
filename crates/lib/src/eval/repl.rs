//! Interactive inspector started on evaluation failure.

use std::io::{self, BufRead, Write};

use mlua::prelude::*;
use tracing::{error, warn};

use super::{Bindings, DebugHook, EvalError, EvalState};

const PROMPT: &str = "sysp-repl> ";

const HELP: &str = "\
The following commands are available:

  <expr>        Evaluate and print a Lua expression
  :env          Show the variables in scope where evaluation failed
  :?            Show this help
  :q            Leave the REPL and continue with the error";

/// Hook that reports the error and opens a REPL on stdin/stdout.
pub fn inspector_hook() -> DebugHook {
  Box::new(|state, err, bindings| {
    announce(err);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    if let Err(e) = run_repl(state, bindings, &mut input, &mut output) {
      warn!(error = %e, "repl terminated");
    }
  })
}

fn announce(err: &EvalError) {
  error!(error = %err, "evaluation failed, starting REPL to inspect the evaluator state");
}

/// Read-eval-print loop over `input` until `:q` or end of input.
pub fn run_repl(
  state: &EvalState,
  bindings: &Bindings,
  input: &mut dyn BufRead,
  output: &mut dyn Write,
) -> io::Result<()> {
  writeln!(output, "Type :? for help.")?;

  loop {
    write!(output, "{}", PROMPT)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
      writeln!(output)?;
      return Ok(());
    }

    match line.trim() {
      "" => {}
      ":q" | ":quit" => return Ok(()),
      ":?" | ":help" => writeln!(output, "{}", HELP)?,
      ":env" => {
        for (name, value) in bindings {
          writeln!(output, "{} = {}", name, render_value(value, 1))?;
        }
      }
      expr => match state.eval_expr(expr, bindings) {
        Ok(value) => writeln!(output, "{}", render_value(&value, 2))?,
        Err(e) => writeln!(output, "error: {}", e)?,
      },
    }
  }
}

/// Render a value for display, expanding tables up to `depth` levels.
pub fn render_value(value: &LuaValue, depth: usize) -> String {
  match value {
    LuaValue::Nil => "nil".to_string(),
    LuaValue::Boolean(b) => b.to_string(),
    LuaValue::Integer(i) => i.to_string(),
    LuaValue::Number(n) => n.to_string(),
    LuaValue::String(s) => format!("{:?}", s.to_string_lossy()),
    LuaValue::Table(_) if depth == 0 => "{ ... }".to_string(),
    LuaValue::Table(table) => {
      let mut entries: Vec<(String, String)> = table
        .pairs::<LuaValue, LuaValue>()
        .flatten()
        .map(|(k, v)| {
          let key = match &k {
            LuaValue::String(s) => s.to_string_lossy(),
            other => format!("[{}]", render_value(other, 0)),
          };
          (key, render_value(&v, depth - 1))
        })
        .collect();
      if entries.is_empty() {
        return "{ }".to_string();
      }
      entries.sort();
      let body: Vec<String> = entries.into_iter().map(|(k, v)| format!("{} = {}", k, v)).collect();
      format!("{{ {} }}", body.join(", "))
    }
    LuaValue::Function(_) => "«function»".to_string(),
    other => format!("«{}»", other.type_name()),
  }
}
