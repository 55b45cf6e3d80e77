use std::fs;
use std::path::Path;

use super::ManifestError;

const TEMPLATE: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
      package="#PACKAGE#">

    <application>
        <uses-library android:name="android.test.runner" />
    </application>

    <instrumentation android:name="#RUNNER#"
                     android:targetPackage="#TESTEDPACKAGE#"
                     android:label="Tests for #TESTEDPACKAGE#"/>
</manifest>
"##;

/// Write the synthetic manifest of an instrumentation test package.
pub fn write_test_manifest(
  output: &Path,
  package: &str,
  tested_package: &str,
  runner: &str,
) -> Result<(), ManifestError> {
  let content = TEMPLATE
    .replace("#PACKAGE#", package)
    .replace("#TESTEDPACKAGE#", tested_package)
    .replace("#RUNNER#", runner);

  let write_err = |source| ManifestError::Write {
    path: output.to_path_buf(),
    source,
  };
  if let Some(parent) = output.parent() {
    fs::create_dir_all(parent).map_err(write_err)?;
  }
  fs::write(output, content).map_err(write_err)
}
