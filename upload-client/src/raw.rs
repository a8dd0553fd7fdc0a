// upload-client/src/raw.rs
use crate::error::UploadError;
use crate::fs::{read_file, resolve_readable, FileAccess};
use std::path::Path;

/// Read a file verbatim for use as a request body.
///
/// The path must resolve to a readable regular file, as for multipart files.
pub fn encode<F: FileAccess + ?Sized>(fs: &F, path: &Path) -> Result<Vec<u8>, UploadError> {
    let resolved = resolve_readable(fs, path)?;
    read_file(fs, &resolved)
}
