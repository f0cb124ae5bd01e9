//! Folder path resolution against a remote folder tree.
//!
//! The tree is a read-only snapshot fetched fresh for every resolution.
//! Missing segments are created through a [`FolderCreator`]; a created node
//! is synthesized locally (with no children) so deeper segments can be
//! resolved without fetching the tree again.
//!
//! Creation is not transactional: if a multi-segment path fails halfway,
//! the ancestors created so far stay in place.

mod resolver;
mod types;

pub use resolver::{FolderCreator, FolderResolver};
pub use types::FolderNode;
