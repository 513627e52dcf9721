use predicates::prelude::*;

use super::common::{TestEnv, read_link_name, stdout_lines};

/// `default.lua` exposing two packages and a pair of them.
fn packages(env: &TestEnv) -> (String, String) {
  let hello = env.add_file("hello", "hello", &[]);
  let tools = env.add_file("tools", "tools", &[]);
  env.write_file(
    "default.lua",
    &format!(
      r#"
local hello = {{ outputs = {{ out = "{hello}" }} }}
return {{
  hello = hello,
  tools = function() return "{tools}" end,
  both = {{ hello, "{tools}" }},
}}
"#
    ),
  );
  (hello, tools)
}

#[test]
fn build_prints_outputs_of_attribute_paths() {
  let env = TestEnv::new();
  let (hello, tools) = packages(&env);

  let output = env.sysp_cmd().args(["build", "hello", "tools"]).output().unwrap();
  assert!(output.status.success());
  assert_eq!(stdout_lines(&output), vec![hello, tools]);
}

#[test]
fn build_accepts_file_and_attribute() {
  let env = TestEnv::new();
  let (hello, _) = packages(&env);
  std::fs::rename(env.work_path().join("default.lua"), env.work_path().join("pkgs.lua")).unwrap();

  env
    .sysp_cmd()
    .args(["build", "pkgs.lua#hello"])
    .assert()
    .success()
    .stdout(format!("{}\n", hello));

  env
    .sysp_cmd()
    .args(["build", "-f", "pkgs.lua", "hello"])
    .assert()
    .success()
    .stdout(format!("{}\n", hello));
}

#[test]
fn build_missing_attribute_fails() {
  let env = TestEnv::new();
  packages(&env);

  env
    .sysp_cmd()
    .args(["build", "nope"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("attribute 'nope' missing"));
}

#[test]
fn build_with_profile_creates_generation() {
  let env = TestEnv::new();
  let (hello, _) = packages(&env);
  let profile = env.profile_path("dev");

  env
    .sysp_cmd()
    .args(["build", "hello", "--profile"])
    .arg(&profile)
    .assert()
    .success();

  assert_eq!(read_link_name(&profile), "dev-1-link");
  assert_eq!(read_link_name(&profile.with_file_name("dev-1-link")), hello);
}

#[test]
fn build_profile_rejects_multiple_outputs() {
  let env = TestEnv::new();
  packages(&env);
  let profile = env.profile_path("dev");

  env
    .sysp_cmd()
    .args(["build", "both", "--profile"])
    .arg(&profile)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("but there are multiple"));

  assert!(std::fs::symlink_metadata(&profile).is_err());
}

#[test]
fn build_profile_rejects_no_outputs() {
  let env = TestEnv::new();
  packages(&env);

  env
    .sysp_cmd()
    .args(["build", "--profile"])
    .arg(env.profile_path("dev"))
    .assert()
    .code(2)
    .stderr(predicate::str::contains("but there are none"));
}

#[test]
fn build_on_dummy_store_cannot_realise() {
  let env = TestEnv::new();
  env.write_file("default.lua", r#"return { ghost = "/sysp/store/ffffffffffffffffffff-ghost" }"#);

  env
    .sysp_cmd()
    .args(["--store", "dummy://", "build", "ghost"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("cannot be built by this store"));
}

#[test]
fn build_creates_out_links() {
  let env = TestEnv::new();
  let (hello, tools) = packages(&env);

  env
    .sysp_cmd()
    .args(["build", "hello", "tools", "--out-link", "result"])
    .assert()
    .success();

  assert_eq!(read_link_name(&env.work_path().join("result")), hello);
  assert_eq!(read_link_name(&env.work_path().join("result-1")), tools);
}

#[test]
fn install_uses_default_profile_and_lists_generations() {
  let env = TestEnv::new();
  let (hello, tools) = packages(&env);
  let profile = env.profile_path("default");

  for attr in ["hello", "tools"] {
    env
      .sysp_cmd()
      .env("SYSP_PROFILE", &profile)
      .args(["install", attr])
      .assert()
      .success();
  }

  assert_eq!(read_link_name(&profile), "default-2-link");

  let output = env
    .sysp_cmd()
    .env("SYSP_PROFILE", &profile)
    .arg("generations")
    .output()
    .unwrap();
  let lines = stdout_lines(&output);
  assert_eq!(lines.len(), 2);
  assert!(lines[0].ends_with(&hello));
  assert!(lines[1].starts_with('*'));
  assert!(lines[1].ends_with(&tools));
}

#[test]
fn install_same_path_twice_keeps_one_generation() {
  let env = TestEnv::new();
  packages(&env);
  let profile = env.profile_path("default");

  for _ in 0..2 {
    env
      .sysp_cmd()
      .args(["install", "hello", "--profile"])
      .arg(&profile)
      .assert()
      .success();
  }

  env
    .sysp_cmd()
    .args(["-o", "json", "generations", "--profile"])
    .arg(&profile)
    .assert()
    .success()
    .stdout(predicate::str::contains("\"number\": 1"))
    .stdout(predicate::str::contains("\"number\": 2").not());
}

#[test]
fn installed_profile_is_an_installable() {
  let env = TestEnv::new();
  let (hello, _) = packages(&env);
  let profile = env.profile_path("default");

  env
    .sysp_cmd()
    .args(["install", "hello", "--profile"])
    .arg(&profile)
    .assert()
    .success();

  env
    .sysp_cmd()
    .arg("path-info")
    .arg(&profile)
    .assert()
    .success()
    .stdout(format!("{}\n", hello));
}
