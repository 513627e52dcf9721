use predicates::prelude::*;

use super::common::{TestEnv, stdout_lines};

#[test]
fn path_info_prints_given_paths() {
  let env = TestEnv::new();
  let hello = env.add_file("hello", "hello", &[]);

  env
    .sysp_cmd()
    .args(["path-info", &hello])
    .assert()
    .success()
    .stdout(format!("{}\n", hello));
}

#[test]
fn path_info_recursive_includes_references() {
  let env = TestEnv::new();
  let libc = env.add_file("libc", "libc", &[]);
  let app = env.add_file("app", "app", &[&libc]);

  let direct = env.sysp_cmd().args(["path-info", &app]).output().unwrap();
  assert_eq!(stdout_lines(&direct), vec![app.clone()]);

  let recursive = env.sysp_cmd().args(["path-info", "-r", &app]).output().unwrap();
  let mut lines = stdout_lines(&recursive);
  lines.sort();
  let mut expected = vec![app, libc];
  expected.sort();
  assert_eq!(lines, expected);
}

#[test]
fn path_info_all_lists_store() {
  let env = TestEnv::new();
  let a = env.add_file("a", "a", &[]);
  let b = env.add_file("b", "b", &[]);

  let output = env.sysp_cmd().args(["path-info", "--all"]).output().unwrap();
  let mut lines = stdout_lines(&output);
  lines.sort();
  let mut expected = vec![a, b];
  expected.sort();
  assert_eq!(lines, expected);
}

#[test]
fn path_info_all_with_arguments_is_usage_error() {
  let env = TestEnv::new();
  let a = env.add_file("a", "a", &[]);

  env
    .sysp_cmd()
    .args(["path-info", "--all", &a])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("'--all' does not expect arguments"));
}

#[test]
fn path_info_json_reports_registration() {
  let env = TestEnv::new();
  let libc = env.add_file("libc", "libc", &[]);
  let app = env.add_file("app", "app", &[&libc]);

  env
    .sysp_cmd()
    .args(["path-info", "--json", "--closure-size", &app])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"nar_hash\""))
    .stdout(predicate::str::contains("\"closure_size\": 7"))
    .stdout(predicate::str::contains(libc.as_str()));
}

#[test]
fn path_info_follows_links_into_store() {
  let env = TestEnv::new();
  let hello = env.add_file("hello", "hello", &[]);

  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(&hello, env.work_path().join("result")).unwrap();
    env
      .sysp_cmd()
      .args(["path-info", "./result"])
      .assert()
      .success()
      .stdout(format!("{}\n", hello));
  }
}

#[test]
fn path_info_unregistered_path_fails() {
  let env = TestEnv::new();
  let hello = env.add_file("hello", "hello", &[]);
  let store_dir = std::path::Path::new(&hello).parent().unwrap();
  let ghost = store_dir.join("ffffffffffffffffffff-ghost");

  env
    .sysp_cmd()
    .arg("path-info")
    .arg(&ghost)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("is not valid"));
}

#[test]
fn references_prints_direct_references() {
  let env = TestEnv::new();
  let libc = env.add_file("libc", "libc", &[]);
  let zlib = env.add_file("zlib", "zlib", &[&libc]);
  let app = env.add_file("app", "app", &[&zlib]);

  env
    .sysp_cmd()
    .args(["references", &app])
    .assert()
    .success()
    .stdout(format!("{}\n", zlib));
}

#[test]
fn references_requires_exactly_one_path() {
  let env = TestEnv::new();
  let a = env.add_file("a", "a", &[]);
  let b = env.add_file("b", "b", &[]);

  env
    .sysp_cmd()
    .args(["references", &a, &b])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("this command requires exactly one store path"));

  env
    .sysp_cmd()
    .arg("references")
    .assert()
    .code(2)
    .stderr(predicate::str::contains("this command requires exactly one store path"));
}
