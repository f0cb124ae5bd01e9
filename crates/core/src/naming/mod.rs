//! Identity naming for attachments.
//!
//! Two modes:
//! - `Hash`: a seeded SHA-256 digest of the payload, rendered as a decimal
//!   string, with the original extension preserved.
//! - `Sanitize`: the original name with diacritics folded, whitespace runs
//!   replaced by `_`, and anything outside `[A-Za-z0-9._-]` removed.
//!
//! The same digest is used by the local tree to decide whether an existing
//! file holds identical bytes.

mod sanitize;

use sha2::{Digest, Sha256};

use notedrop_shared::{NamingMode, NamingSettings};

use crate::attachment::Attachment;

pub use sanitize::sanitize_name;

/// Seeded content digest.
///
/// First eight bytes (big-endian) of `SHA-256(seed_le || bytes)`.
#[must_use]
pub fn content_digest(seed: u64, bytes: &[u8]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(bytes);
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Derives the candidate storage name for an attachment.
#[must_use]
pub fn candidate_name(attachment: &Attachment, naming: &NamingSettings) -> String {
    match naming.mode {
        NamingMode::Hash => {
            let digest = content_digest(naming.digest_seed(), attachment.data());
            let extension = extension_of(attachment.original_name())
                .map(str::to_string)
                .or_else(|| extension_for_type(attachment.content_type()));
            match extension {
                Some(ext) => format!("{digest}.{ext}"),
                None => digest.to_string(),
            }
        }
        NamingMode::Sanitize => sanitize_name(attachment.original_name()),
    }
}

/// Splits `name` into stem and extension (extension without the dot).
///
/// Leading dots do not start an extension: `.env` has no extension.
#[must_use]
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

fn extension_of(name: &str) -> Option<&str> {
    split_extension(name).1
}

fn extension_for_type(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        return None;
    }
    mime_guess::get_mime_extensions_str(essence)
        .and_then(|exts| exts.first())
        .map(|ext| (*ext).to_string())
}
