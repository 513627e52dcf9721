use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn edit_opens_definition_in_editor() {
  let env = TestEnv::new();
  let definition = env.write_file("pkgs/hello.lua", "-- the hello package\n");
  env.write_file(
    "default.lua",
    &format!(
      r#"return {{ hello = {{ outputs = {{}}, meta = {{ position = "{}:1" }} }} }}"#,
      definition.display()
    ),
  );

  env
    .sysp_cmd()
    .env("EDITOR", "cat")
    .args(["edit", "hello"])
    .assert()
    .success()
    .stdout(predicate::str::contains("the hello package"));
}

#[test]
fn edit_without_position_fails() {
  let env = TestEnv::new();
  env.write_file("default.lua", r#"return { bare = "/nowhere" }"#);

  env
    .sysp_cmd()
    .env("EDITOR", "cat")
    .args(["edit", "bare"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("does not have a source position"));
}
