//! Object-store adapter for attachments using Apache OpenDAL.
//!
//! Keys are `{folder}/{name}`. A best-effort `stat` skips the write when the
//! key already exists; a failed check counts as "absent" and never aborts the
//! upload. Public URLs are composed from configuration, not from the
//! operator:
//!
//! ```text
//! subdomain style   https://bucket.host/folder/name
//! path style        https://host/bucket/folder/name
//! custom URL        {custom_url}/folder/name
//! ```

mod error;
mod service;
mod url;

pub use error::StorageError;
pub use service::ObjectStoreService;
pub use url::{PublicUrl, UrlStyle};
