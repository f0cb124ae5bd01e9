//! Upload pipeline error types.

use thiserror::Error;

use super::types::UploadNotice;

/// Orchestrator errors. Adapter errors never escape as-is; they are turned
/// into notices and, when nothing succeeded, into [`UploadError::AllBackendsFailed`].
#[derive(Debug, Error)]
pub enum UploadError {
    /// An enabled backend has no adapter configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Every enabled backend failed for this attachment.
    #[error("every enabled backend failed for {file}")]
    AllBackendsFailed {
        /// Original file name.
        file: String,
        /// One notice per failed or skipped backend.
        notices: Vec<UploadNotice>,
    },

    /// The note could not be read or updated.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl UploadError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Notices carried by the error, if any.
    #[must_use]
    pub fn notices(&self) -> &[UploadNotice] {
        match self {
            Self::AllBackendsFailed { notices, .. } => notices,
            _ => &[],
        }
    }
}

/// Note buffer errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Reading or writing the note failed.
    #[error("document I/O failed: {0}")]
    Io(String),
}

/// Remote download errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure.
    #[error("download failed: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("download returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}
