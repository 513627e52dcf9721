//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the data directory
/// (and therefore the default store and profiles) and a work directory used
/// as the current directory of every command.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("work")).unwrap();
    Self { temp }
  }

  /// Write a file relative to the work directory, returning its path.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.work_path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Write an executable shell script relative to the work directory.
  #[cfg(unix)]
  pub fn write_script(&self, relative_path: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = self.write_file(relative_path, &format!("#!/bin/sh\n{}\n", body));
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  pub fn work_path(&self) -> PathBuf {
    let p = self.temp.path().join("work");
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Data path (`XDG_DATA_HOME`); the default store lives under `sysp/`.
  pub fn data_path(&self) -> PathBuf {
    let p = self.temp.path().join("data");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn profile_path(&self, name: &str) -> PathBuf {
    self.temp.path().join("profiles").join(name)
  }

  /// Get a pre-configured Command for the sysp binary.
  ///
  /// Clears every `SYSP_*` override and points `XDG_DATA_HOME`/`APPDATA` at
  /// the isolated data path.
  pub fn sysp_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("sysp");
    cmd.current_dir(self.work_path());
    cmd.env("XDG_DATA_HOME", self.data_path());
    cmd.env("APPDATA", self.data_path()); // For Windows
    cmd.env_remove("SYSP_STORE");
    cmd.env_remove("SYSP_PATH");
    cmd.env_remove("SYSP_PROFILE");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// Add `source` (relative to the work directory) to the store.
  pub fn add(&self, source: &str, references: &[&str]) -> String {
    let mut cmd = self.sysp_cmd();
    cmd.arg("add").arg(source);
    for reference in references {
      cmd.arg("--reference").arg(reference);
    }
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap().trim().to_string()
  }

  /// Write `content` to `name` and add it to the store.
  pub fn add_file(&self, name: &str, content: &str, references: &[&str]) -> String {
    self.write_file(name, content);
    self.add(name, references)
  }
}

/// Lines of a command's stdout.
pub fn stdout_lines(output: &std::process::Output) -> Vec<String> {
  String::from_utf8_lossy(&output.stdout)
    .lines()
    .map(str::to_string)
    .collect()
}

pub fn read_link_name(path: &Path) -> String {
  std::fs::read_link(path).unwrap().display().to_string()
}
