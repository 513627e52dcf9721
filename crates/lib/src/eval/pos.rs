use std::fmt;
use std::path::PathBuf;

/// A source position. Line 0 means unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
  pub file: PathBuf,
  pub line: u32,
}

impl Pos {
  pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
    Self {
      file: file.into(),
      line,
    }
  }

  /// Parse `file`, `file:line` or `file:line:column` (the column is dropped).
  pub fn parse(s: &str) -> Self {
    let numeric = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());

    let parts: Vec<&str> = s.rsplitn(3, ':').collect();
    match parts.as_slice() {
      [col, line, file] if numeric(col) && numeric(line) => Self::new(*file, line.parse().unwrap_or(0)),
      [line, ..] if numeric(line) => {
        let file = &s[..s.len() - line.len() - 1];
        Self::new(file, line.parse().unwrap_or(0))
      }
      _ => Self::new(s, 0),
    }
  }
}

impl fmt::Display for Pos {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.line > 0 {
      write!(f, "{}:{}", self.file.display(), self.line)
    } else {
      write!(f, "{}", self.file.display())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_positions() {
    assert_eq!(Pos::parse("/pkgs/hello.lua:12"), Pos::new("/pkgs/hello.lua", 12));
    assert_eq!(Pos::parse("/pkgs/hello.lua:12:4"), Pos::new("/pkgs/hello.lua", 12));
    assert_eq!(Pos::parse("/pkgs/hello.lua"), Pos::new("/pkgs/hello.lua", 0));
    assert_eq!(Pos::parse("C:/pkgs/x.lua:7"), Pos::new("C:/pkgs/x.lua", 7));
  }

  #[test]
  fn display_omits_unknown_line() {
    assert_eq!(Pos::new("a.lua", 3).to_string(), "a.lua:3");
    assert_eq!(Pos::new("a.lua", 0).to_string(), "a.lua");
  }
}
