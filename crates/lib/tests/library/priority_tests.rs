//! Which layer or library wins, and in what order inputs are handed out.

use super::common::{Workspace, manifest};

const FLAVORS: &str = r#"{
  "defaultConfig": { "name": "main", "versionCode": 1, "versionName": "base", "minSdkVersion": 4 },
  "productFlavors": [
    { "name": "one", "versionName": "one", "minSdkVersion": 9 },
    { "name": "two" },
    { "name": "three", "minSdkVersion": 14 }
  ]
}"#;

#[test]
fn last_flavor_that_sets_a_field_wins() {
  let ws = Workspace::new();
  let plan = ws.project(FLAVORS).variant("release", &["one", "two", "three"]).unwrap();
  let merged = plan.merged_config();

  // Set only by the first flavor and the default.
  assert_eq!(merged.version_name.as_deref(), Some("one"));
  // Set by the first and the last flavor.
  assert_eq!(merged.min_sdk_version, Some(14));
  // Set only by the default.
  assert_eq!(merged.version_code, Some(1));
}

#[test]
fn diamond_dependency_appears_once() {
  let ws = Workspace::new();
  ws.library("a", "com.a");
  ws.library("b", "com.b");
  ws.library("c", "com.c");
  let project = ws.project(
    r#"{
      "libraries": {
        "a": { "folder": "libs/a", "dependencies": ["c"] },
        "b": { "folder": "libs/b", "dependencies": ["c"] },
        "c": { "folder": "libs/c" }
      },
      "dependencies": ["a", "b"]
    }"#,
  );
  let plan = project.variant::<&str>("debug", &[]).unwrap();

  let names: Vec<&str> = plan.flattened_libraries().iter().map(|l| l.name()).collect();
  assert_eq!(names, vec!["a", "b", "c"]);
  assert_eq!(plan.library_packages().unwrap().as_deref(), Some("com.a:com.b:com.c"));
}

#[test]
fn resource_overlays_run_from_build_type_to_libraries() {
  let ws = Workspace::new();
  ws.library("ui", "com.ui");
  let project = ws.project(
    r#"{
      "productFlavors": [{ "name": "free" }, { "name": "arm" }],
      "libraries": { "ui": { "folder": "libs/ui" } },
      "dependencies": ["ui"]
    }"#,
  );
  let plan = project.variant("debug", &["free", "arm"]).unwrap();

  assert_eq!(
    plan.resource_inputs(),
    vec![
      ws.path("src/debug/res"),
      ws.path("src/free/res"),
      ws.path("src/arm/res"),
      ws.path("src/main/res"),
      ws.path("libs/ui/res"),
    ]
  );
}

#[test]
fn manifest_inputs_use_direct_libraries_only() {
  let ws = Workspace::new();
  ws.library("ui", "com.ui");
  ws.library("core", "com.core");
  manifest(&ws.path("src/free/AndroidManifest.xml"), "com.example");
  let project = ws.project(
    r#"{
      "productFlavors": [{ "name": "free" }],
      "libraries": {
        "ui": { "folder": "libs/ui", "dependencies": ["core"] },
        "core": { "folder": "libs/core" }
      },
      "dependencies": ["ui"]
    }"#,
  );
  let plan = project.variant("debug", &["free"]).unwrap();

  assert_eq!(
    plan.manifest_inputs(),
    vec![
      ws.path("src/main/AndroidManifest.xml"),
      ws.path("src/free/AndroidManifest.xml"),
      ws.path("libs/ui/AndroidManifest.xml"),
    ]
  );
  assert_eq!(plan.manifest_overlays(), vec![ws.path("src/free/AndroidManifest.xml")]);
}

#[test]
fn queries_are_repeatable() {
  let ws = Workspace::new();
  ws.library("ui", "com.ui");
  ws.mkdir("libs/ui/aidl");
  let project = ws.project(
    r#"{ "libraries": { "ui": { "folder": "libs/ui" } }, "dependencies": ["ui"] }"#,
  );
  let plan = project.variant::<&str>("debug", &[]).unwrap();

  assert_eq!(plan.resource_inputs(), plan.resource_inputs());
  assert_eq!(plan.compile_classpath(), plan.compile_classpath());
  assert_eq!(plan.aidl_imports(), vec![ws.path("libs/ui/aidl")]);
  assert_eq!(plan.package_name().unwrap(), plan.package_name().unwrap());
  assert_eq!(plan.build_config_lines(), plan.build_config_lines());
}

#[test]
fn suffix_applies_on_top_of_flavor_package() {
  let ws = Workspace::new();
  let project = ws.project(
    r#"{
      "buildTypes": [{ "name": "debug", "packageNameSuffix": "debug" }],
      "productFlavors": [{ "name": "paid", "packageName": "com.example.paid" }]
    }"#,
  );
  assert_eq!(
    project.variant("debug", &["paid"]).unwrap().package_name().unwrap(),
    "com.example.paid.debug"
  );
  assert_eq!(
    project.variant::<&str>("debug", &[]).unwrap().package_name().unwrap(),
    "com.example.debug"
  );
  assert_eq!(
    project.variant("release", &["paid"]).unwrap().package_name().unwrap(),
    "com.example.paid"
  );
}

#[test]
fn library_test_variant_compiles_against_the_library() {
  let ws = Workspace::new();
  let project = ws.project(r#"{ "kind": "library" }"#);
  let test = project.test_variant::<&str>("debug", &[]).unwrap();

  let classpath = test.compile_classpath();
  assert!(classpath.contains(&ws.path("build/bundles/debug/classes.jar")));
  assert_eq!(test.tested_package_name().unwrap().as_deref(), Some("com.example.test"));
}
