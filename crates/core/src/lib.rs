//! Core attachment pipeline for notedrop.
//!
//! This crate holds the naming, routing, storage and rendering logic.
//! It has no HTTP client; remote collaborators are traits implemented in
//! `notedrop-client` or by test doubles.
//!
//! # Modules
//!
//! - `naming` - Hash and sanitized candidate names
//! - `folder` - Folder path resolution over a remote tree snapshot
//! - `storage` - Object-store adapter
//! - `vault` - Local content tree adapter with content deduplication
//! - `eagle` - Asset-manager adapter
//! - `embed` - Content classification and embed markup
//! - `upload` - Orchestration, document staging and batch commands

pub mod attachment;
pub mod backend;
pub mod eagle;
pub mod embed;
pub mod folder;
pub mod naming;
pub mod storage;
pub mod upload;
pub mod vault;

pub use attachment::{Attachment, AttachmentOrigin};
pub use backend::Backend;
