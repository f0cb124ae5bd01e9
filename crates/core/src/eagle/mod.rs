//! Asset-manager (Eagle) adapter.
//!
//! The asset manager never receives raw bytes. It ingests a URL produced by
//! the object store or an absolute path produced by the local tree, files the
//! new item under a resolved folder, and is addressed afterwards as
//! `eagle://item/{id}`.

mod api;
mod error;
mod service;

pub use api::{EagleApi, ItemSource, NewItem};
pub use error::EagleError;
pub use service::{EAGLE_SCHEME, EagleService, item_uri};
