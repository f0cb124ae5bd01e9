//! Content classification.

use serde::{Deserialize, Serialize};

/// Coarse content category driving embed markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    /// Raster or vector image.
    Image,
    /// Video.
    Video,
    /// Audio.
    Audio,
    /// PDF document.
    Pdf,
    /// Presentation.
    SlideDeck,
    /// Word-processor document.
    WordDocument,
    /// Spreadsheet.
    Spreadsheet,
    /// Compressed archive.
    Archive,
    /// Markdown note.
    MarkdownNote,
    /// Anything else.
    Unknown,
}

impl ContentCategory {
    /// Classify by declared content type, falling back to the file extension
    /// when the type is missing or generic.
    #[must_use]
    pub fn classify(content_type: &str, file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "md" || extension == "markdown" {
            return Self::MarkdownNote;
        }

        let declared = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let essence = if declared.is_empty() || declared == "application/octet-stream" {
            mime_guess::from_path(file_name)
                .first_raw()
                .unwrap_or_default()
                .to_string()
        } else {
            declared
        };

        Self::from_mime(&essence)
    }

    fn from_mime(essence: &str) -> Self {
        if essence.starts_with("image/") {
            return Self::Image;
        }
        if essence.starts_with("video/") {
            return Self::Video;
        }
        if essence.starts_with("audio/") {
            return Self::Audio;
        }

        match essence {
            "application/pdf" => Self::Pdf,
            "application/vnd.ms-powerpoint"
            | "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            | "application/vnd.oasis.opendocument.presentation" => Self::SlideDeck,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/vnd.oasis.opendocument.text"
            | "application/rtf" => Self::WordDocument,
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.oasis.opendocument.spreadsheet"
            | "text/csv" => Self::Spreadsheet,
            "application/zip"
            | "application/x-zip-compressed"
            | "application/x-7z-compressed"
            | "application/x-rar-compressed"
            | "application/vnd.rar"
            | "application/x-tar"
            | "application/gzip"
            | "application/x-gzip"
            | "application/x-bzip2"
            | "application/x-xz" => Self::Archive,
            "text/markdown" | "text/x-markdown" => Self::MarkdownNote,
            _ => Self::Unknown,
        }
    }
}
