//! Attachments: the immutable payload handed to the upload pipeline.
//!
//! An attachment is created once per user action (paste, drop, or a scan of
//! existing references), owned by the call that produced it, and discarded
//! when that call completes.

mod types;

pub use types::{Attachment, AttachmentOrigin};
