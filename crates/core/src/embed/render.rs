//! Markup policy table.

use notedrop_shared::ViewerSettings;

use super::category::ContentCategory;
use crate::backend::Backend;
use crate::eagle::EAGLE_SCHEME;

const PDF_VIEWER: &str = "https://docs.google.com/viewer?embedded=true&url=";
const OFFICE_VIEWER: &str = "https://view.officeapps.live.com/op/embed.aspx?src=";

/// One embed to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embed<'a> {
    location: &'a str,
    category: ContentCategory,
    backend: Backend,
    label: Option<&'a str>,
}

impl<'a> Embed<'a> {
    /// Create an embed for a stored location.
    #[must_use]
    pub fn new(location: &'a str, category: ContentCategory, backend: Backend) -> Self {
        Self {
            location,
            category,
            backend,
            label: None,
        }
    }

    /// Set the visible label; defaults to the last segment of the location.
    #[must_use]
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Render the markup.
    #[must_use]
    pub fn render(&self, viewers: &ViewerSettings) -> String {
        let location = self.location.replace(' ', "%20");
        let label = self.label.map_or_else(|| base_name(self.location), str::to_string);
        let asset_manager =
            self.backend == Backend::AssetManager || self.location.starts_with(EAGLE_SCHEME);
        // inline viewers need a location a browser can fetch
        let viewable = !asset_manager && self.backend != Backend::LocalTree;

        match self.category {
            ContentCategory::Image if asset_manager => link(&label, &location),
            ContentCategory::Image => format!("![{label}]({location})"),
            ContentCategory::Video => format!(r#"<video src="{location}" controls></video>"#),
            ContentCategory::Audio => format!(r#"<audio src="{location}" controls></audio>"#),
            ContentCategory::Pdf if viewable && viewers.pdf => iframe(PDF_VIEWER, &location),
            ContentCategory::SlideDeck if viewable && viewers.slides => {
                iframe(OFFICE_VIEWER, &location)
            }
            ContentCategory::WordDocument if viewable && viewers.word => {
                iframe(OFFICE_VIEWER, &location)
            }
            ContentCategory::Spreadsheet if viewable && viewers.spreadsheet => {
                iframe(OFFICE_VIEWER, &location)
            }
            ContentCategory::MarkdownNote if !asset_manager => {
                format!("[[{}]]", note_name(self.location))
            }
            ContentCategory::Pdf
            | ContentCategory::SlideDeck
            | ContentCategory::WordDocument
            | ContentCategory::Spreadsheet
            | ContentCategory::MarkdownNote
            | ContentCategory::Archive
            | ContentCategory::Unknown => link(&label, &location),
        }
    }
}

/// Render the markup for `location` with the default label.
#[must_use]
pub fn render(
    location: &str,
    category: ContentCategory,
    backend: Backend,
    viewers: &ViewerSettings,
) -> String {
    Embed::new(location, category, backend).render(viewers)
}

fn link(label: &str, location: &str) -> String {
    format!("[{label}]({location})")
}

fn iframe(viewer: &str, location: &str) -> String {
    format!(
        r#"<iframe src="{viewer}{}" width="100%" height="600px" frameborder="0"></iframe>"#,
        urlencoding::encode(location)
    )
}

/// Last path segment of a location, without query or fragment.
fn base_name(location: &str) -> String {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let segment = path.rsplit('/').next().unwrap_or(path);
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |s| s.into_owned())
}

/// Note-link target: base name without the markdown extension.
fn note_name(location: &str) -> String {
    let name = base_name(location);
    let lower = name.to_ascii_lowercase();
    for ext in [".md", ".markdown"] {
        if lower.ends_with(ext) {
            return name[..name.len() - ext.len()].to_string();
        }
    }
    name
}
