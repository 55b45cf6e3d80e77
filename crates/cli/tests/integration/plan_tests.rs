//! `vforge plan` against fixture projects.

use predicates::prelude::*;

use super::common::TestEnv;

fn app_env() -> TestEnv {
  let env = TestEnv::from_fixture("app.json");
  env.library("libs/core", "com.example.core");
  env.library("libs/ui", "com.example.ui");
  env
}

#[test]
fn plan_text_shows_merged_flavor_values() {
  let env = app_env();
  env
    .cmd()
    .current_dir(env.temp.path())
    .args(["plan", "-f", "free"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Variant: freeDebug"))
    .stdout(predicate::str::contains("Version code: 7"))
    .stdout(predicate::str::contains("Version name: 1.0"))
    .stdout(predicate::str::contains("Library packages: com.example.ui:com.example.core"));
}

#[test]
fn plan_json_is_machine_readable() {
  let env = app_env();
  let output = env
    .cmd()
    .arg("plan")
    .arg("-p")
    .arg(&env.project_path)
    .args(["-b", "staging", "-f", "free", "-f", "paid", "-o", "json"])
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["variant"], "freePaidStaging");
  assert_eq!(json["kind"], "application");
  assert_eq!(json["package"], "com.example.paid.staging");
  assert_eq!(json["mergedConfig"]["versionCode"], 7);
  assert_eq!(json["flattenedLibraries"], serde_json::json!(["ui", "core"]));
  let lines = json["buildConfigLines"].as_array().unwrap();
  assert_eq!(lines[0], "// lines from default config.");
}

#[test]
fn plan_accepts_project_folder() {
  let env = app_env();
  env
    .cmd()
    .arg("plan")
    .arg("-p")
    .arg(env.temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Variant: debug"));
}

#[test]
fn plan_test_variant() {
  let env = TestEnv::from_fixture("build.json");
  let output = env
    .cmd()
    .arg("plan")
    .arg("-p")
    .arg(&env.project_path)
    .args(["--test", "-o", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["variant"], "debugTest");
  assert_eq!(json["kind"], "test");
  assert_eq!(json["package"], "com.example.test");
  assert_eq!(json["testedPackage"], "com.example");
}

#[test]
fn plan_library_project() {
  let env = TestEnv::from_fixture("library.json");
  env
    .cmd()
    .arg("plan")
    .arg("-p")
    .arg(&env.project_path)
    .args(["-b", "release"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Kind: library"))
    .stdout(predicate::str::contains("Debuggable: false"));
}

#[test]
fn library_cycle_is_reported_with_its_kind() {
  let env = TestEnv::from_fixture("cycle.json");
  env
    .cmd()
    .arg("plan")
    .arg("-p")
    .arg(&env.project_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("[dependency-cycle]"))
    .stderr(predicate::str::contains("a -> b -> a"));
}

#[test]
fn unknown_flavor_is_a_configuration_error() {
  let env = app_env();
  env
    .cmd()
    .arg("plan")
    .arg("-p")
    .arg(&env.project_path)
    .args(["-f", "gold"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("[configuration]"))
    .stderr(predicate::str::contains("gold"));
}

#[test]
fn missing_main_manifest_fails() {
  let env = TestEnv::from_fixture("build.json");
  std::fs::remove_file(env.path("src/main/AndroidManifest.xml")).unwrap();
  env
    .cmd()
    .arg("plan")
    .arg("-p")
    .arg(&env.project_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("manifest"));
}
