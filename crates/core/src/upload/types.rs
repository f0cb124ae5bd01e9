//! Upload pipeline types.

use std::fmt;

use notedrop_shared::BackendToggles;

use crate::backend::Backend;

/// Where an attachment ended up. At least one field is set on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResult {
    /// Public object-store URL.
    pub object_store_url: Option<String>,
    /// Asset-manager location (`eagle://item/{id}`).
    pub asset_manager_uri: Option<String>,
    /// Tree-relative local path.
    pub local_path: Option<String>,
}

impl UploadResult {
    /// Returns true if no backend produced a location.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.object_store_url.is_none()
            && self.asset_manager_uri.is_none()
            && self.local_path.is_none()
    }

    /// Highest-priority location: object store, then local tree, then asset manager.
    #[must_use]
    pub fn preferred(&self) -> Option<(&str, Backend)> {
        if let Some(url) = &self.object_store_url {
            return Some((url, Backend::ObjectStore));
        }
        if let Some(path) = &self.local_path {
            return Some((path, Backend::LocalTree));
        }
        self.asset_manager_uri
            .as_deref()
            .map(|uri| (uri, Backend::AssetManager))
    }
}

/// A user-visible message about a recovered or terminal failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadNotice {
    /// Backend concerned, if any.
    pub backend: Option<Backend>,
    /// Message.
    pub message: String,
}

impl UploadNotice {
    /// Create a notice.
    #[must_use]
    pub fn new(backend: Option<Backend>, message: impl Into<String>) -> Self {
        Self {
            backend,
            message: message.into(),
        }
    }

    /// Notice for a failed backend call.
    #[must_use]
    pub fn failed(backend: Backend, error: &impl fmt::Display) -> Self {
        Self::new(Some(backend), error.to_string())
    }
}

impl fmt::Display for UploadNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.backend {
            Some(backend) => write!(f, "[{backend}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Why routing decided to do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No backend is enabled.
    NothingEnabled,
    /// The attachment was dropped and drag upload is off for this note.
    DragUploadDisabled,
}

/// Routing decision for one attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Do nothing.
    Skip(SkipReason),
    /// Store in the local tree only; leave the placeholder in place.
    LocalOnly,
    /// Run the enabled backends.
    Backends(BackendToggles),
}

/// Result of running the pipeline for one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Routing decided to do nothing.
    Skipped(SkipReason),
    /// Stored in the local tree only; no markup is produced.
    LocalOnly(UploadResult),
    /// Stored in at least one backend; `markup` replaces the placeholder.
    Embedded {
        /// Locations per backend.
        result: UploadResult,
        /// Markup for the preferred location.
        markup: String,
        /// Recovered failures.
        notices: Vec<UploadNotice>,
    },
}

impl UploadOutcome {
    /// Recovered failures reported alongside a success.
    #[must_use]
    pub fn notices(&self) -> &[UploadNotice] {
        match self {
            Self::Embedded { notices, .. } => notices,
            _ => &[],
        }
    }
}
