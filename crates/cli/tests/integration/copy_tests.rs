use predicates::prelude::*;

use super::common::{TestEnv, stdout_lines};

#[test]
fn copy_transfers_closure_by_default() {
  let env = TestEnv::new();
  let libc = env.add_file("libc", "libc", &[]);
  let app = env.add_file("app", "app", &[&libc]);
  let dest = env.temp.path().join("dest");

  env
    .sysp_cmd()
    .arg("copy")
    .arg("--to")
    .arg(&dest)
    .arg(&app)
    .assert()
    .success()
    .stdout(predicate::str::contains("Paths copied: 2"));

  let output = env
    .sysp_cmd()
    .arg("--store")
    .arg(&dest)
    .args(["path-info", "--all"])
    .output()
    .unwrap();
  let names: Vec<String> = stdout_lines(&output)
    .iter()
    .filter_map(|p| p.rsplit('/').next().map(str::to_string))
    .collect();
  assert_eq!(names.len(), 2);
  for original in [&app, &libc] {
    let base = original.rsplit('/').next().unwrap();
    assert!(names.iter().any(|n| n == base), "{} not copied", base);
  }
}

#[test]
fn copy_no_recursive_needs_references_in_destination() {
  let env = TestEnv::new();
  let libc = env.add_file("libc", "libc", &[]);
  let app = env.add_file("app", "app", &[&libc]);
  let dest = env.temp.path().join("dest");

  env
    .sysp_cmd()
    .arg("copy")
    .arg("--no-recursive")
    .arg("--to")
    .arg(&dest)
    .arg(&app)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("is not valid"));

  env
    .sysp_cmd()
    .arg("copy")
    .arg("--no-recursive")
    .arg("--to")
    .arg(&dest)
    .arg(&libc)
    .assert()
    .success();
}

#[test]
fn copy_all_skips_present_paths() {
  let env = TestEnv::new();
  env.add_file("a", "a", &[]);
  env.add_file("b", "b", &[]);
  let dest = env.temp.path().join("dest");

  for expected in ["Paths copied: 2", "Paths copied: 0"] {
    env
      .sysp_cmd()
      .arg("copy")
      .arg("--all")
      .arg("--to")
      .arg(&dest)
      .assert()
      .success()
      .stdout(predicate::str::contains(expected));
  }
}

#[test]
fn copy_to_dummy_store_fails() {
  let env = TestEnv::new();
  let a = env.add_file("a", "a", &[]);

  env
    .sysp_cmd()
    .args(["copy", "--to", "dummy://", &a])
    .assert()
    .code(1);
}
