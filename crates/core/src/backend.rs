//! Storage backend identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three places an attachment can end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// S3-compatible object storage.
    ObjectStore,
    /// Local content-addressed folder tree.
    LocalTree,
    /// Third-party asset manager.
    AssetManager,
}

impl Backend {
    /// Stable string value, used in logs and notices.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectStore => "object_store",
            Self::LocalTree => "local_tree",
            Self::AssetManager => "asset_manager",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
