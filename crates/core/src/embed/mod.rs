//! Embed markup generation.
//!
//! Maps (content category, backend, location) to the markup inserted into a
//! note. Asset-manager locations are always linked, never inlined as images,
//! because the `eagle://` scheme only resolves inside the asset manager.

mod category;
mod render;

pub use category::ContentCategory;
pub use render::{Embed, render};
