//! Final package assembly.
//!
//! A [`PackageAssembler`] writes into a temporary archive next to the output.
//! Every archive path may be added once: a second source for the same path is
//! a [`PackageError::Duplicate`] and nothing is left at the output location.
//! [`PackageAssembler::seal`] consumes the assembler, optionally signs the
//! archive, and only then moves it into place as a [`SealedPackage`].

pub mod filter;
pub mod signing;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::consts::{APP_NAME, CLASSES_DEX, GDBSERVER, NATIVE_LIBS_DIR};
use crate::error::ErrorKind;
use crate::util::fs::walk_files;

pub use signing::{JavaTools, Signer, SigningError, SigningInfo};

/// Errors while assembling a package.
#[derive(Debug, Error)]
pub enum PackageError {
  #[error("output {} is a directory", path.display())]
  OutputIsDirectory { path: PathBuf },

  #[error("package input {} is not a regular file", path.display())]
  MissingInput { path: PathBuf },

  #[error("native library folder {} {reason}", path.display())]
  NativeFolder { path: PathBuf, reason: &'static str },

  #[error("duplicate files copied in package: {archive_path}\n  first:  {}\n  second: {}", first.display(), second.display())]
  Duplicate {
    archive_path: String,
    first: PathBuf,
    second: PathBuf,
  },

  #[error("failed to read {}: {source}", path.display())]
  Zip {
    path: PathBuf,
    #[source]
    source: ZipError,
  },

  #[error("io error at {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Signing(#[from] SigningError),
}

impl PackageError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      PackageError::OutputIsDirectory { .. }
      | PackageError::MissingInput { .. }
      | PackageError::NativeFolder { .. } => ErrorKind::Configuration,
      PackageError::Duplicate { .. } => ErrorKind::PackagingConflict,
      PackageError::Zip { .. } | PackageError::Io { .. } => ErrorKind::Io,
      PackageError::Signing(_) => ErrorKind::Signing,
    }
  }

  fn io(path: &Path, source: io::Error) -> Self {
    PackageError::Io {
      path: path.to_path_buf(),
      source,
    }
  }

  fn zip(path: &Path, source: ZipError) -> Self {
    PackageError::Zip {
      path: path.to_path_buf(),
      source,
    }
  }
}

/// Native libraries found while copying a jar's Java resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JarStatus {
  pub native_libs: Vec<String>,
  /// Some of them sit under `lib/` and would shadow the package's own.
  pub native_libs_conflict: bool,
}

/// A finished package at its final location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedPackage {
  pub path: PathBuf,
  pub entries: usize,
  pub signed: bool,
}

/// An open, unsealed package.
///
/// Dropping it without sealing removes the temporary archive.
pub struct PackageAssembler {
  output: PathBuf,
  temp: NamedTempFile,
  writer: ZipWriter<File>,
  added: BTreeMap<String, PathBuf>,
  debug_jni: bool,
}

impl PackageAssembler {
  /// Open a package at `output`, starting with the compiled resource archive
  /// and the converted bytecode.
  pub fn new(output: &Path, resource_archive: &Path, dex: &Path) -> Result<Self, PackageError> {
    if output.is_dir() {
      return Err(PackageError::OutputIsDirectory {
        path: output.to_path_buf(),
      });
    }
    for input in [resource_archive, dex] {
      if !input.is_file() {
        return Err(PackageError::MissingInput {
          path: input.to_path_buf(),
        });
      }
    }

    if output.exists() {
      debug!(output = %output.display(), "removing stale package");
      fs::remove_file(output).map_err(|e| PackageError::io(output, e))?;
    }

    let dir = match output.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| PackageError::io(&dir, e))?;
    let temp = tempfile::Builder::new()
      .prefix(&format!(".{}-", APP_NAME))
      .suffix(".ap_")
      .tempfile_in(&dir)
      .map_err(|e| PackageError::io(&dir, e))?;
    let file = temp.reopen().map_err(|e| PackageError::io(temp.path(), e))?;

    info!(output = %output.display(), "packaging");
    let mut assembler = Self {
      output: output.to_path_buf(),
      temp,
      writer: ZipWriter::new(file),
      added: BTreeMap::new(),
      debug_jni: false,
    };
    assembler.add_zip(resource_archive)?;
    assembler.add_file(dex, CLASSES_DEX)?;
    Ok(assembler)
  }

  /// Include `gdbserver` next to native libraries.
  pub fn set_debug_jni_mode(&mut self, debug_jni: bool) {
    self.debug_jni = debug_jni;
  }

  /// Paths added so far, each with the file it came from.
  pub fn entries(&self) -> &BTreeMap<String, PathBuf> {
    &self.added
  }

  /// Add one file at `archive_path`.
  pub fn add_file(&mut self, file: &Path, archive_path: &str) -> Result<(), PackageError> {
    self.claim(archive_path, file)?;
    debug!(source = %file.display(), archive_path, "=>");

    let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    if archive_path.ends_with(GDBSERVER) {
      options = options.unix_permissions(0o755);
    }
    let mut input = File::open(file).map_err(|e| PackageError::io(file, e))?;
    self
      .writer
      .start_file(archive_path, options)
      .map_err(|e| PackageError::zip(&self.output, e))?;
    io::copy(&mut input, &mut self.writer).map_err(|e| PackageError::io(file, e))?;
    Ok(())
  }

  /// Add every packageable file below a Java-resource folder.
  pub fn add_source_folder(&mut self, folder: &Path) -> Result<(), PackageError> {
    debug!(folder = %folder.display(), "adding java resources");
    let files = walk_files(folder, filter::keep_folder).map_err(|e| PackageError::io(folder, e))?;
    for file in files {
      let name = file.path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
      if filter::keep_file(name) {
        self.add_file(&file.path, &file.relative)?;
      }
    }
    Ok(())
  }

  /// Copy the Java resources of a jar, reporting any native libraries in it.
  pub fn add_resources_from_jar(&mut self, jar: &Path) -> Result<JarStatus, PackageError> {
    debug!(jar = %jar.display(), "adding jar resources");
    let mut status = JarStatus::default();
    self.copy_zip(jar, |path| {
      if !filter::keep_archive_path(path) {
        return false;
      }
      if path.ends_with(".so") || path.ends_with(".jnilib") {
        status.native_libs.push(path.to_string());
        if path.ends_with(".so") && path.starts_with(&format!("{}/", NATIVE_LIBS_DIR)) {
          status.native_libs_conflict = true;
        }
      }
      true
    })?;

    if !status.native_libs.is_empty() {
      warn!(
        jar = %jar.display(),
        libs = ?status.native_libs,
        conflict = status.native_libs_conflict,
        "jar contains native libraries"
      );
    }
    Ok(status)
  }

  /// Add `<folder>/<abi>/*.so` as `lib/<abi>/<name>`.
  pub fn add_native_libraries(&mut self, folder: &Path) -> Result<(), PackageError> {
    if !folder.is_dir() {
      let reason = if folder.exists() { "is not a folder" } else { "does not exist" };
      return Err(PackageError::NativeFolder {
        path: folder.to_path_buf(),
        reason,
      });
    }
    debug!(folder = %folder.display(), "adding native libraries");

    for abi in sorted_entries(folder)? {
      if !abi.is_dir() {
        continue;
      }
      let abi_name = file_name(&abi);
      for lib in sorted_entries(&abi)? {
        let name = file_name(&lib);
        let wanted = name.ends_with(".so") || (self.debug_jni && name == GDBSERVER);
        if lib.is_file() && wanted {
          self.add_file(&lib, &format!("{}/{}/{}", NATIVE_LIBS_DIR, abi_name, name))?;
        }
      }
    }
    Ok(())
  }

  /// Finish the archive, sign it when credentials are given, and move it to
  /// the output location.
  pub fn seal(self, signing: Option<(&Signer<'_>, &SigningInfo)>) -> Result<SealedPackage, PackageError> {
    let Self {
      output,
      temp,
      writer,
      added,
      ..
    } = self;

    writer.finish().map_err(|e| PackageError::zip(&output, e))?;

    if let Some((signer, info)) = signing {
      signer.sign(temp.path(), info)?;
    }

    temp.persist(&output).map_err(|e| PackageError::io(&output, e.error))?;
    info!(output = %output.display(), entries = added.len(), "package sealed");
    Ok(SealedPackage {
      path: output,
      entries: added.len(),
      signed: signing.is_some(),
    })
  }

  fn add_zip(&mut self, archive: &Path) -> Result<(), PackageError> {
    debug!(archive = %archive.display(), "adding archive");
    self.copy_zip(archive, |_| true)
  }

  fn copy_zip<F>(&mut self, archive: &Path, mut keep: F) -> Result<(), PackageError>
  where
    F: FnMut(&str) -> bool,
  {
    let file = File::open(archive).map_err(|e| PackageError::io(archive, e))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| PackageError::zip(archive, e))?;

    for i in 0..zip.len() {
      let mut entry = zip.by_index(i).map_err(|e| PackageError::zip(archive, e))?;
      if entry.is_dir() {
        continue;
      }
      let name = entry.name().to_string();
      if !keep(&name) {
        continue;
      }
      self.claim(&name, archive)?;
      debug!(source = %archive.display(), archive_path = %name, "=>");

      let method = match entry.compression() {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
      };
      self
        .writer
        .start_file(name.as_str(), SimpleFileOptions::default().compression_method(method))
        .map_err(|e| PackageError::zip(&self.output, e))?;
      io::copy(&mut entry, &mut self.writer).map_err(|e| PackageError::io(archive, e))?;
    }
    Ok(())
  }

  fn claim(&mut self, archive_path: &str, source: &Path) -> Result<(), PackageError> {
    if let Some(first) = self.added.get(archive_path) {
      return Err(PackageError::Duplicate {
        archive_path: archive_path.to_string(),
        first: first.clone(),
        second: source.to_path_buf(),
      });
    }
    self.added.insert(archive_path.to_string(), source.to_path_buf());
    Ok(())
  }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, PackageError> {
  let mut entries = fs::read_dir(dir)
    .and_then(|rd| rd.map(|e| e.map(|e| e.path())).collect::<io::Result<Vec<_>>>())
    .map_err(|e| PackageError::io(dir, e))?;
  entries.sort();
  Ok(entries)
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default()
}
