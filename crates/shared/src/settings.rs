//! Destination settings: which backends receive an attachment, where, and
//! under which name.
//!
//! Settings are an immutable value. Per-note overrides are applied with
//! [`DestinationSettings::merged`], which returns a new value for the
//! current operation only.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which backends are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToggles {
    /// Upload bytes to the object store.
    pub object_store: bool,
    /// Write bytes into the local content tree.
    pub local_tree: bool,
    /// Register the stored file with the asset manager.
    pub asset_manager: bool,
}

impl BackendToggles {
    /// All backends disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            object_store: false,
            local_tree: false,
            asset_manager: false,
        }
    }

    /// Returns true when at least one backend is enabled.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.object_store || self.local_tree || self.asset_manager
    }
}

impl Default for BackendToggles {
    fn default() -> Self {
        Self {
            object_store: true,
            local_tree: false,
            asset_manager: false,
        }
    }
}

/// How candidate names are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// Seeded digest of the payload bytes.
    #[default]
    Hash,
    /// Sanitized original file name.
    Sanitize,
}

/// Naming configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingSettings {
    /// Naming mode.
    pub mode: NamingMode,
    /// Seed mixed into content digests. Changing it breaks deduplication.
    ///
    /// Required in hash mode, see [`AppConfig::validate`](crate::AppConfig::validate).
    pub seed: Option<u64>,
}

impl NamingSettings {
    /// The seed used for content digests, zero when unset.
    #[must_use]
    pub fn digest_seed(&self) -> u64 {
        self.seed.unwrap_or_default()
    }

    /// Generates a fresh random seed.
    ///
    /// The top bit is cleared so the value fits a TOML integer.
    #[must_use]
    pub fn fresh_seed() -> u64 {
        rand::random::<u64>() >> 1
    }
}

/// Inline viewer toggles for document embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Embed PDFs through the external viewer.
    pub pdf: bool,
    /// Embed word-processor documents through the office viewer.
    pub word: bool,
    /// Embed slide decks through the office viewer.
    pub slides: bool,
    /// Embed spreadsheets through the office viewer.
    pub spreadsheet: bool,
}

/// A folder path that may contain `${year}`, `${month}` and `${day}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderTemplate(String);

impl FolderTemplate {
    /// Creates a template from raw text.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitutes date placeholders and trims surrounding slashes.
    #[must_use]
    pub fn render(&self, date: NaiveDate) -> String {
        self.0
            .replace("${year}", &date.year().to_string())
            .replace("${month}", &format!("{:02}", date.month()))
            .replace("${day}", &format!("{:02}", date.day()))
            .trim_matches('/')
            .to_string()
    }
}

impl fmt::Display for FolderTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full destination settings for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationSettings {
    /// Enabled backends.
    pub backends: BackendToggles,
    /// Object-store key prefix.
    pub object_store_folder: FolderTemplate,
    /// Folder inside the local tree.
    pub local_folder: FolderTemplate,
    /// Slash-delimited asset-manager folder path; empty means the library root.
    pub asset_manager_folder: FolderTemplate,
    /// Naming configuration.
    pub naming: NamingSettings,
    /// Viewer toggles used by the embed renderer.
    pub viewers: ViewerSettings,
    /// Store only in the local tree and leave the placeholder untouched.
    pub local_only: bool,
    /// Upload attachments that were dragged into a note.
    pub drag_upload: bool,
}

impl Default for DestinationSettings {
    fn default() -> Self {
        Self {
            backends: BackendToggles::default(),
            object_store_folder: FolderTemplate::new("${year}/${month}"),
            local_folder: FolderTemplate::new("attachments"),
            asset_manager_folder: FolderTemplate::default(),
            naming: NamingSettings::default(),
            viewers: ViewerSettings::default(),
            local_only: false,
            drag_upload: true,
        }
    }
}

impl DestinationSettings {
    /// Returns a copy with the per-note override applied.
    #[must_use]
    pub fn merged(&self, note: &NoteOverride) -> Self {
        let mut merged = self.clone();
        if let Some(local_only) = note.local_only {
            merged.local_only = local_only;
        }
        if let Some(drag_upload) = note.drag_upload {
            merged.drag_upload = drag_upload;
        }
        merged
    }
}

/// Per-note override fields, read from a note's front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct NoteOverride {
    /// Overrides [`DestinationSettings::local_only`].
    #[serde(rename = "notedrop-local-only")]
    pub local_only: Option<bool>,
    /// Overrides [`DestinationSettings::drag_upload`].
    #[serde(rename = "notedrop-drag-upload")]
    pub drag_upload: Option<bool>,
}

impl NoteOverride {
    /// Parses the YAML front matter at the top of a note.
    ///
    /// A note without front matter, or with front matter that does not
    /// parse, yields no override.
    #[must_use]
    pub fn from_front_matter(note: &str) -> Self {
        let Some(rest) = note.strip_prefix("---") else {
            return Self::default();
        };
        let Some(end) = rest.find("\n---") else {
            return Self::default();
        };

        match serde_yaml::from_str::<Self>(&rest[..end]) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unparseable front matter");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[rstest]
    #[case("${year}/${month}", "2024/03")]
    #[case("/img/${year}-${month}-${day}/", "img/2024-03-07")]
    #[case("static", "static")]
    #[case("", "")]
    fn test_folder_template_render(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(FolderTemplate::new(template).render(date()), expected);
    }

    #[test]
    fn test_merged_override_wins() {
        let settings = DestinationSettings::default();
        let note = NoteOverride {
            local_only: Some(true),
            drag_upload: Some(false),
        };

        let merged = settings.merged(&note);
        assert!(merged.local_only);
        assert!(!merged.drag_upload);
        // original untouched
        assert!(!settings.local_only);
        assert!(settings.drag_upload);
    }

    #[test]
    fn test_merged_empty_override_is_identity() {
        let settings = DestinationSettings::default();
        assert_eq!(settings.merged(&NoteOverride::default()), settings);
    }

    #[test]
    fn test_front_matter_parsed() {
        let note = "---\ntitle: Trip\nnotedrop-local-only: true\n---\n# Body\n";
        let parsed = NoteOverride::from_front_matter(note);
        assert_eq!(parsed.local_only, Some(true));
        assert_eq!(parsed.drag_upload, None);
    }

    #[test]
    fn test_front_matter_absent_or_broken() {
        assert_eq!(
            NoteOverride::from_front_matter("# Just a note"),
            NoteOverride::default()
        );
        assert_eq!(
            NoteOverride::from_front_matter("---\nnotedrop-local-only: [unclosed\n---\n"),
            NoteOverride::default()
        );
    }

    #[test]
    fn test_default_seed_is_unset() {
        let naming = NamingSettings::default();
        assert_eq!(naming.seed, None);
        assert_eq!(naming.digest_seed(), 0);
    }

    #[test]
    fn test_fresh_seed_fits_toml_integer() {
        for _ in 0..32 {
            assert!(i64::try_from(NamingSettings::fresh_seed()).is_ok());
        }
    }

    #[test]
    fn test_backend_toggles_any() {
        assert!(!BackendToggles::none().any());
        assert!(BackendToggles::default().any());
    }
}
