//! Attachment types and data structures.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// How an attachment entered the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentOrigin {
    /// Pasted from the clipboard.
    #[default]
    Paste,
    /// Dragged onto the note.
    Drop,
    /// Found by scanning existing references in a note.
    Scan,
}

impl AttachmentOrigin {
    /// Stable string value, used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paste => "paste",
            Self::Drop => "drop",
            Self::Scan => "scan",
        }
    }
}

/// Binary payload plus its declared content type and original name.
#[derive(Debug, Clone)]
pub struct Attachment {
    data: Bytes,
    content_type: String,
    original_name: String,
    origin: AttachmentOrigin,
}

impl Attachment {
    /// Create a new attachment.
    #[must_use]
    pub fn new(
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
        original_name: impl Into<String>,
    ) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            original_name: original_name.into(),
            origin: AttachmentOrigin::default(),
        }
    }

    /// Set the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: AttachmentOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Payload bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Declared MIME type; may be empty.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Name the attachment had before it was stored.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Origin of the attachment.
    #[must_use]
    pub fn origin(&self) -> AttachmentOrigin {
        self.origin
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for an empty payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_defaults_to_paste() {
        let attachment = Attachment::new(vec![1, 2, 3], "image/png", "cat.png");
        assert_eq!(attachment.origin(), AttachmentOrigin::Paste);
        assert_eq!(attachment.len(), 3);
        assert_eq!(attachment.original_name(), "cat.png");
    }

    #[test]
    fn test_attachment_clone_shares_bytes() {
        let attachment =
            Attachment::new(vec![9; 64], "image/png", "a.png").with_origin(AttachmentOrigin::Drop);
        let copy = attachment.clone();
        assert_eq!(copy.data().as_ptr(), attachment.data().as_ptr());
        assert_eq!(copy.origin(), AttachmentOrigin::Drop);
    }
}
