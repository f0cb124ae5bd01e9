//! Local-tree error types.

use thiserror::Error;

/// Local-tree operation errors.
#[derive(Debug, Error)]
pub enum VaultError {
    /// File not found in the tree.
    #[error("file not found: {path}")]
    NotFound {
        /// Tree-relative path.
        path: String,
    },

    /// Tree configuration error.
    #[error("local tree configuration error: {0}")]
    Configuration(String),

    /// Path escapes the tree or is malformed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Filesystem operation error.
    #[error("local tree operation failed: {0}")]
    Operation(String),
}

impl VaultError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }
}

impl From<opendal::Error> for VaultError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                path: err.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}
