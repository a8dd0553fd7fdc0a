// upload-client/src/fs.rs
use crate::error::UploadError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File access used by the encoders - users can substitute their own
pub trait FileAccess {
    /// Resolve to an absolute path with symlinks and `..` removed
    fn canonicalize(&self, path: &Path) -> Option<PathBuf>;

    fn is_regular_file(&self, path: &Path) -> bool;

    fn is_readable(&self, path: &Path) -> bool;

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// `FileAccess` backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileAccess for LocalFs {
    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        fs::canonicalize(path).ok()
    }

    fn is_regular_file(&self, path: &Path) -> bool {
        fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    fn is_readable(&self, path: &Path) -> bool {
        fs::File::open(path).is_ok()
    }

    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// Check that `path` resolves to a readable regular file and return its
/// canonical form
pub(crate) fn resolve_readable<F: FileAccess + ?Sized>(
    fs: &F,
    path: &Path,
) -> Result<PathBuf, UploadError> {
    let resolved = fs
        .canonicalize(path)
        .ok_or_else(|| UploadError::file_access(path, "path does not resolve"))?;

    if !fs.is_regular_file(&resolved) {
        return Err(UploadError::file_access(resolved, "not a regular file"));
    }
    if !fs.is_readable(&resolved) {
        return Err(UploadError::file_access(resolved, "not readable"));
    }

    Ok(resolved)
}

/// Read a whole file through `fs`, mapping I/O failures to `FileAccess`
pub(crate) fn read_file<F: FileAccess + ?Sized>(
    fs: &F,
    path: &Path,
) -> Result<Vec<u8>, UploadError> {
    fs.read_all(path)
        .map_err(|e| UploadError::file_access(path, e.to_string()))
}
