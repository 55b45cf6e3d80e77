//! `vforge build` with an SDK made of shell scripts.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn build_without_sdk_fails() {
  let env = TestEnv::from_fixture("build.json");
  env.write_file("classes/Main.class", "");
  env
    .cmd()
    .arg("build")
    .arg("-p")
    .arg(&env.project_path)
    .arg("--classes")
    .arg(env.path("classes"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("[configuration]"));
}

#[test]
fn build_requires_classes() {
  let env = TestEnv::from_fixture("build.json");
  env
    .cmd()
    .arg("build")
    .arg("-p")
    .arg(&env.project_path)
    .assert()
    .failure()
    .stderr(predicate::str::contains("--classes"));
}

#[cfg(unix)]
#[test]
fn release_build_produces_unsigned_package() {
  let env = TestEnv::from_fixture("build.json");
  let sdk = env.fake_sdk();
  env.write_file("classes/com/example/Main.class", "");
  env.write_file("src/main/resources/config.properties", "mode=test");

  env
    .cmd()
    .arg("build")
    .arg("-p")
    .arg(&env.project_path)
    .args(["-b", "release"])
    .arg("--classes")
    .arg(env.path("classes"))
    .arg("--sdk")
    .arg(&sdk)
    .assert()
    .success()
    .stdout(predicate::str::contains("Built release"))
    .stdout(predicate::str::contains("release.apk"))
    .stderr(predicate::str::contains("unsigned"));

  let package = env.path("build/release/release.apk");
  let archive = zip::ZipArchive::new(std::fs::File::open(&package).unwrap()).unwrap();
  let names: Vec<&str> = archive.file_names().collect();
  assert!(names.contains(&"resources.arsc"));
  assert!(names.contains(&"classes.dex"));
  assert!(names.contains(&"config.properties"));

  let log = env.tool_log();
  assert!(log.contains("--version-code 3"));
  assert!(log.contains("-0 ogg"));
  assert!(log.contains("--force-jumbo"));
  assert!(env.path("build/release/source/com/example/BuildConfig.java").is_file());
}

#[cfg(unix)]
#[test]
fn duplicate_java_resource_fails_with_packaging_conflict() {
  let env = TestEnv::from_fixture("build.json");
  let sdk = env.fake_sdk();
  env.write_file("classes/Main.class", "");
  env.write_file("src/main/resources/app.properties", "a=1");
  env.write_file("src/release/resources/app.properties", "a=2");

  env
    .cmd()
    .arg("build")
    .arg("-p")
    .arg(&env.project_path)
    .args(["-b", "release", "-o", "json"])
    .arg("--classes")
    .arg(env.path("classes"))
    .arg("--sdk")
    .arg(&sdk)
    .assert()
    .failure()
    .stderr(predicate::str::contains("[packaging-conflict]"))
    .stderr(predicate::str::contains("app.properties"));

  assert!(!env.path("build/release/release.apk").exists());
}

#[cfg(unix)]
#[test]
fn build_json_report_lists_steps() {
  let env = TestEnv::from_fixture("build.json");
  let sdk = env.fake_sdk();
  env.write_file("classes/Main.class", "");

  let output = env
    .cmd()
    .arg("build")
    .arg("-p")
    .arg(&env.project_path)
    .args(["-b", "release", "-o", "json"])
    .arg("--classes")
    .arg(env.path("classes"))
    .arg("--out")
    .arg(env.path("out"))
    .arg("--sdk")
    .arg(&sdk)
    .output()
    .unwrap();
  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(
    json["steps"],
    serde_json::json!([
      "merge-manifest",
      "compile-aidl",
      "generate-build-config",
      "process-resources",
      "convert-bytecode",
      "package"
    ])
  );
  assert_eq!(json["package"]["signed"], false);
  assert!(env.path("out/release.apk").is_file());
}

#[cfg(unix)]
#[test]
fn library_build_stops_after_resources() {
  let env = TestEnv::from_fixture("library.json");
  let sdk = env.fake_sdk();
  env.write_file("classes/Lib.class", "");
  env.write_file(
    "src/debug/AndroidManifest.xml",
    &super::common::manifest_xml("com.example"),
  );

  env
    .cmd()
    .arg("build")
    .arg("-p")
    .arg(&env.project_path)
    .arg("--classes")
    .arg(env.path("classes"))
    .arg("--sdk")
    .arg(&sdk)
    .assert()
    .success()
    .stdout(predicate::str::contains("Built debug"))
    .stdout(predicate::str::contains("no package produced"));

  assert!(env.path("build/debug/manifest/AndroidManifest.xml").is_file());
  assert!(!env.path("build/debug/debug.apk").exists());
  assert!(!env.tool_log().contains("dx "));
}
