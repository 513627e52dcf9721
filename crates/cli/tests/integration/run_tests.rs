#![cfg(unix)]

use predicates::prelude::*;

use super::common::TestEnv;

/// A package whose `bin/` holds a `hello` script.
fn hello_package(env: &TestEnv) -> String {
  env.write_script("hello-pkg/bin/hello", "echo \"hello from $0\"");
  env.add("hello-pkg", &[])
}

#[test]
fn run_puts_outputs_on_path() {
  let env = TestEnv::new();
  let hello = hello_package(&env);

  env
    .sysp_cmd()
    .args(["run", &hello, "-c", "hello"])
    .assert()
    .success()
    .stdout(predicate::str::contains(format!("hello from {}/bin/hello", hello)));
}

#[test]
fn run_propagates_exit_status() {
  let env = TestEnv::new();
  env.write_script("fail-pkg/bin/fail", "exit 7");
  let fail = env.add("fail-pkg", &[]);

  env.sysp_cmd().args(["run", &fail, "-c", "fail"]).assert().code(7);
}

#[test]
fn run_ignore_environment_keeps_only_listed_variables() {
  let env = TestEnv::new();
  let hello = hello_package(&env);

  env
    .sysp_cmd()
    .env("SYSP_TEST_KEEP", "kept")
    .env("SYSP_TEST_DROP", "dropped")
    .args(["run", "-i", "-k", "SYSP_TEST_KEEP", &hello, "-c", "/usr/bin/env"])
    .assert()
    .success()
    .stdout(predicate::str::contains("SYSP_TEST_KEEP=kept"))
    .stdout(predicate::str::contains(format!("PATH={}/bin", hello)))
    .stdout(predicate::str::contains("SYSP_TEST_DROP").not());
}

#[test]
fn run_unset_removes_variable() {
  let env = TestEnv::new();
  let hello = hello_package(&env);

  env
    .sysp_cmd()
    .env("SYSP_TEST_DROP", "dropped")
    .args(["run", "-u", "SYSP_TEST_DROP", &hello, "-c", "/usr/bin/env"])
    .assert()
    .success()
    .stdout(predicate::str::contains("SYSP_TEST_DROP").not());
}

#[test]
fn run_rejects_contradictory_environment_flags() {
  let env = TestEnv::new();
  let hello = hello_package(&env);

  env
    .sysp_cmd()
    .args(["run", "-i", "-u", "HOME", &hello, "-c", "true"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("--unset does not make sense with --ignore-environment"));

  env
    .sysp_cmd()
    .args(["run", "-k", "HOME", &hello, "-c", "true"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("--keep does not make sense without --ignore-environment"));
}
