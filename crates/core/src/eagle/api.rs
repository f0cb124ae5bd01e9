//! Asset-manager API seam.
//!
//! Implemented over HTTP by `notedrop-client`.

use std::future::Future;
use std::path::PathBuf;

use super::error::EagleError;
use crate::folder::FolderNode;

/// What the asset manager should ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    /// Public URL produced by the object store.
    Url(String),
    /// Absolute filesystem path produced by the local tree.
    Path(PathBuf),
}

/// Request to create one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// URL or path to ingest.
    pub source: ItemSource,
    /// Display name.
    pub name: String,
    /// Provenance tags.
    pub tags: Vec<String>,
    /// Destination folder; `None` files the item at the library root.
    pub folder_id: Option<String>,
    /// Free-text annotation.
    pub annotation: String,
}

/// Calls exposed by the asset manager's local API.
pub trait EagleApi: Send + Sync {
    /// Fetch the full folder tree.
    fn list_folders(&self) -> impl Future<Output = Result<Vec<FolderNode>, EagleError>> + Send;

    /// Create a folder under `parent_id` (empty for the root); returns its id.
    fn create_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> impl Future<Output = Result<String, EagleError>> + Send;

    /// Create an item. Returns the new id when the service reports one.
    fn add_item(
        &self,
        item: &NewItem,
    ) -> impl Future<Output = Result<Option<String>, EagleError>> + Send;

    /// Find an item id by exact name inside a folder (`None` = any folder).
    fn find_item(
        &self,
        name: &str,
        folder_id: Option<&str>,
    ) -> impl Future<Output = Result<Option<String>, EagleError>> + Send;
}
