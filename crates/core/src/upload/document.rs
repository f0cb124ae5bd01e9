//! Note buffer access, placeholders and embed reference scanning.

use std::future::Future;
use std::sync::{LazyLock, Mutex, PoisonError};

use regex::Regex;
use uuid::Uuid;

use super::error::DocumentError;

/// The note being edited.
///
/// Every mutation the pipeline makes goes through [`DocumentBuffer::replace_first`],
/// so concurrent uploads only ever touch their own placeholder.
pub trait DocumentBuffer: Send + Sync {
    /// Current text.
    fn read(&self) -> impl Future<Output = Result<String, DocumentError>> + Send;

    /// Replace the first occurrence of `from` with `to`.
    ///
    /// Returns false if `from` is no longer present.
    fn replace_first(
        &self,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<bool, DocumentError>> + Send;

    /// Overwrite the whole text.
    fn write(&self, text: String) -> impl Future<Output = Result<(), DocumentError>> + Send;
}

/// A note held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDocument {
    text: Mutex<String>,
}

impl InMemoryDocument {
    /// Create a document with initial text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(text.into()),
        }
    }

    /// Snapshot of the current text.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DocumentBuffer for InMemoryDocument {
    async fn read(&self) -> Result<String, DocumentError> {
        Ok(self.text())
    }

    async fn replace_first(&self, from: &str, to: &str) -> Result<bool, DocumentError> {
        let mut text = self.text.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(replace_first_in(&mut text, from, to))
    }

    async fn write(&self, text: String) -> Result<(), DocumentError> {
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = text;
        Ok(())
    }
}

/// Replace the first occurrence of `from` in `text`. Returns false if absent.
pub fn replace_first_in(text: &mut String, from: &str, to: &str) -> bool {
    match text.find(from) {
        Some(start) => {
            text.replace_range(start..start + from.len(), to);
            true
        }
        None => false,
    }
}

/// A unique placeholder shown while `name` uploads.
#[must_use]
pub fn placeholder_for(name: &str) -> String {
    format!("![Uploading {name}... {}]()", Uuid::new_v4().simple())
}

/// Marker left in the note when every backend failed for `name`.
#[must_use]
pub fn error_marker(name: &str) -> String {
    format!("![Upload failed: {name}]()")
}

/// Embed syntax a reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `![alt](target)`
    Markdown,
    /// `![[target]]` or `![[target|alias]]`
    Wiki,
}

/// One embed reference found in a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Full matched text.
    pub text: String,
    /// Target path or URL, percent-decoded for local paths.
    pub target: String,
    /// Syntax.
    pub kind: ReferenceKind,
}

impl Reference {
    /// Last path segment of the target.
    #[must_use]
    pub fn file_name(&self) -> &str {
        let path = self.target.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path)
    }
}

static MARKDOWN_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]*\]\((<[^>]+>|[^)\s]+)(?:\s+[^)]*)?\)").expect("valid regex")
});

static WIKI_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]|#]+)(?:[#|][^\]]*)?\]\]").expect("valid regex"));

fn is_remote(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

fn is_local(target: &str) -> bool {
    !target.contains("://") && !target.starts_with("data:")
}

fn markdown_references(text: &str) -> impl Iterator<Item = (String, String)> + '_ {
    MARKDOWN_EMBED.captures_iter(text).map(|caps| {
        let target = caps[1].trim_start_matches('<').trim_end_matches('>');
        (caps[0].to_string(), target.to_string())
    })
}

/// Embeds that point at files in the local tree, in document order.
#[must_use]
pub fn local_references(text: &str) -> Vec<Reference> {
    let mut found: Vec<(usize, Reference)> = Vec::new();

    for caps in MARKDOWN_EMBED.captures_iter(text) {
        let raw = caps[1].trim_start_matches('<').trim_end_matches('>');
        if !is_local(raw) {
            continue;
        }
        let target = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
        found.push((
            caps.get(0).map_or(0, |m| m.start()),
            Reference {
                text: caps[0].to_string(),
                target,
                kind: ReferenceKind::Markdown,
            },
        ));
    }

    for caps in WIKI_EMBED.captures_iter(text) {
        let target = caps[1].trim();
        if target.is_empty() || !is_local(target) {
            continue;
        }
        found.push((
            caps.get(0).map_or(0, |m| m.start()),
            Reference {
                text: caps[0].to_string(),
                target: target.to_string(),
                kind: ReferenceKind::Wiki,
            },
        ));
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, reference)| reference).collect()
}

/// Markdown embeds that point at `http(s)` URLs, in document order.
#[must_use]
pub fn remote_references(text: &str) -> Vec<Reference> {
    markdown_references(text)
        .filter(|(_, target)| is_remote(target))
        .map(|(text, target)| Reference {
            text,
            target,
            kind: ReferenceKind::Markdown,
        })
        .collect()
}

/// A reference swapped for a placeholder, awaiting upload or download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    /// The reference as it was in the note.
    pub reference: Reference,
    /// Placeholder now occupying its position.
    pub placeholder: String,
}

/// Replace each reference with its own placeholder, one occurrence at a time.
///
/// Staging is sequential so every placeholder lands on a distinct occurrence
/// before any concurrent work starts.
pub async fn stage<D: DocumentBuffer>(
    doc: &D,
    references: Vec<Reference>,
) -> Result<Vec<Staged>, DocumentError> {
    let mut staged = Vec::with_capacity(references.len());
    for reference in references {
        let placeholder = placeholder_for(reference.file_name());
        if doc.replace_first(&reference.text, &placeholder).await? {
            staged.push(Staged {
                reference,
                placeholder,
            });
        }
    }
    Ok(staged)
}
