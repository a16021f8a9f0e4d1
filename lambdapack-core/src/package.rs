//! Function archive packaging

use crate::error::PackageError;
use crate::function::{BINARY_ENTRY, BOOTSTRAP_ENTRY};
use base64::{engine::general_purpose, Engine};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Both entries must be executable inside the Lambda sandbox
const ENTRY_MODE: u32 = 0o755;

/// Result of building an archive
#[derive(Debug, Clone)]
pub struct PackageSummary {
    pub path: PathBuf,
    pub size: u64,
    /// Base64 SHA-256 of the archive, same encoding Lambda uses for `CodeSha256`
    pub sha256: String,
}

/// Build a zip at `output` holding `binary` as `binary` and `bootstrap` as
/// `bootstrap`.
///
/// Inputs are opened before the output is created, so an unreadable input
/// leaves no archive behind.
pub fn create_function_package(
    output: &Path,
    binary: &Path,
    bootstrap: &Path,
) -> Result<PackageSummary, PackageError> {
    let mut sources = Vec::with_capacity(2);
    for (entry, path) in [(BINARY_ENTRY, binary), (BOOTSTRAP_ENTRY, bootstrap)] {
        let file = File::open(path).map_err(|source| PackageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        sources.push((entry, path, file));
    }

    let file = File::create(output).map_err(|source| PackageError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(ENTRY_MODE);

    for (entry, path, mut source) in sources {
        zip.start_file(entry, options)?;
        io::copy(&mut source, &mut zip).map_err(|source| PackageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(entry, path = %path.display(), "Added archive entry");
    }
    zip.finish()?;

    let data = fs::read(output).map_err(|source| PackageError::Read {
        path: output.to_path_buf(),
        source,
    })?;
    let sha256 = general_purpose::STANDARD.encode(Sha256::digest(&data));

    Ok(PackageSummary {
        path: output.to_path_buf(),
        size: data.len() as u64,
        sha256,
    })
}

/// Entry names of an archive, in archive order
pub fn package_entries(path: &Path) -> Result<Vec<String>, PackageError> {
    let file = File::open(path).map_err(|source| PackageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file)?;

    (0..archive.len())
        .map(|index| -> Result<String, PackageError> {
            Ok(archive.by_index(index)?.name().to_string())
        })
        .collect()
}

/// Removes the archive when dropped, on every exit path.
#[derive(Debug)]
pub struct ArchiveGuard {
    path: PathBuf,
}

impl ArchiveGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArchiveGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed archive"),
            // Packaging may have failed before the file existed
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove archive"),
        }
    }
}
