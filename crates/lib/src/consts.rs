//! Well-known names shared across the crate.

/// Application name, used for temporary file prefixes and log targets.
pub const APP_NAME: &str = "vforge";

/// Default project descriptor file name.
pub const PROJECT_FILE: &str = "vforge.json";

/// Environment variables consulted (in order) to locate the SDK.
pub const SDK_ENV_VARS: &[&str] = &["ANDROID_SDK_ROOT", "ANDROID_HOME"];

/// Overrides the per-user directory that holds the debug keystore.
pub const SDK_HOME_ENV: &str = "ANDROID_SDK_HOME";

/// Per-user directory name (under `$HOME`) holding the debug keystore.
pub const USER_DIR_NAME: &str = ".android";

/// File name of the auto-created debug keystore.
pub const DEBUG_KEYSTORE_FILE: &str = "debug.keystore";

/// Instrumentation runner used when no layer sets one.
pub const DEFAULT_TEST_RUNNER: &str = "android.test.InstrumentationTestRunner";

/// Archive path of the converted bytecode inside a package.
pub const CLASSES_DEX: &str = "classes.dex";

/// Archive folder holding native libraries inside a package.
pub const NATIVE_LIBS_DIR: &str = "lib";

/// Debug server binary packaged next to native libraries in debug-JNI builds.
pub const GDBSERVER: &str = "gdbserver";
