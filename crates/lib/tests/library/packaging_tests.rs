//! Package assembly through the public API.

use vforge_lib::error::{BuildError, ErrorKind};
use vforge_lib::package::PackageAssembler;

use super::common::{Workspace, write};

fn inputs(ws: &Workspace) -> (std::path::PathBuf, std::path::PathBuf) {
  use std::io::Write;
  use zip::write::SimpleFileOptions;

  let archive = ws.path("build/resources.ap_");
  std::fs::create_dir_all(archive.parent().unwrap()).unwrap();
  let mut zip = zip::ZipWriter::new(std::fs::File::create(&archive).unwrap());
  zip.start_file("resources.arsc", SimpleFileOptions::default()).unwrap();
  zip.write_all(b"arsc").unwrap();
  zip.finish().unwrap();

  let dex = write(&ws.path("build/classes.dex"), "dex");
  (archive, dex)
}

#[test]
fn same_path_from_two_folders_is_a_conflict() {
  let ws = Workspace::new();
  let (archive, dex) = inputs(&ws);
  write(&ws.path("src/debug/resources/a/config.properties"), "x=1");
  write(&ws.path("src/main/resources/a/config.properties"), "x=2");

  let output = ws.path("build/app.apk");
  let mut assembler = PackageAssembler::new(&output, &archive, &dex).unwrap();
  assembler.add_source_folder(&ws.path("src/debug/resources")).unwrap();
  let err = assembler.add_source_folder(&ws.path("src/main/resources")).unwrap_err();

  assert_eq!(BuildError::from(err).kind(), ErrorKind::PackagingConflict);
  drop(assembler);
  assert!(!output.exists());
}

#[test]
fn sealed_package_without_signing() {
  let ws = Workspace::new();
  let (archive, dex) = inputs(&ws);
  write(&ws.path("src/main/resources/config.properties"), "x=1");
  write(&ws.path("src/main/resources/Main.java"), "class Main {}");

  let output = ws.path("build/app.apk");
  let mut assembler = PackageAssembler::new(&output, &archive, &dex).unwrap();
  assembler.add_source_folder(&ws.path("src/main/resources")).unwrap();
  let sealed = assembler.seal(None).unwrap();

  assert!(!sealed.signed);
  assert_eq!(sealed.path, output);
  assert_eq!(sealed.entries, 3);
  assert!(output.is_file());
}
