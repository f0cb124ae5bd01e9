//! Shared configuration, settings, and errors for notedrop.
//!
//! This crate provides the types every other crate agrees on:
//! - Application configuration loaded from files and the environment
//! - Destination settings and per-note overrides
//! - Application-wide error types

pub mod config;
pub mod error;
pub mod settings;

pub use config::{AppConfig, EagleConfig, ObjectStoreConfig, VaultConfig};
pub use error::{AppError, AppResult};
pub use settings::{
    BackendToggles, DestinationSettings, FolderTemplate, NamingMode, NamingSettings, NoteOverride,
    ViewerSettings,
};
