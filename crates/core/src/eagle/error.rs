//! Asset-manager error types.

use thiserror::Error;

/// Asset-manager operation errors.
#[derive(Debug, Error)]
pub enum EagleError {
    /// Transport failure (connection refused, timeout, ...).
    #[error("asset manager unreachable: {0}")]
    Transport(String),

    /// Non-200 HTTP status.
    #[error("asset manager returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response envelope did not report success.
    #[error("asset manager rejected request: {0}")]
    Rejected(String),

    /// Response body could not be decoded.
    #[error("unexpected asset manager response: {0}")]
    Decode(String),

    /// The destination folder could not be resolved or created.
    #[error("folder unavailable: {0}")]
    FolderUnavailable(String),

    /// The item was accepted but could not be found afterwards.
    #[error("item '{name}' not found after creation")]
    ItemNotFound {
        /// Display name used for the lookup.
        name: String,
    },
}

impl EagleError {
    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
