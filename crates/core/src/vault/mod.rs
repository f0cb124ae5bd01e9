//! Local content-tree adapter.
//!
//! Writes attachments under a folder of the local tree, deduplicating by
//! content: an existing file with identical bytes is reused, a different
//! file with the same name pushes the new one to `{stem}-{n}{ext}`.

mod error;
mod service;

pub use error::VaultError;
pub use service::{VaultService, VaultStored};
