// upload-client/src/error.rs
use crate::http::HttpError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a send before any response is stored
#[derive(Debug, Error)]
pub enum UploadError {
    /// A file could not be resolved, is not a regular file, or is not readable
    #[error("cannot access file {}: {reason}", .path.display())]
    FileAccess { path: PathBuf, reason: String },

    /// The transport rejected the request options before the request was issued
    #[error("transport rejected request options: {0}")]
    TransportConfiguration(#[source] HttpError),

    /// No bootstrap URL has been set on the session
    #[error("bootstrap URL is not set")]
    NotConfigured,
}

impl UploadError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileAccess {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
