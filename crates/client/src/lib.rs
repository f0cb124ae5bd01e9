//! HTTP implementations of the notedrop remote collaborators.
//!
//! - [`EagleClient`] talks to the asset manager's local JSON API.
//! - [`HttpFetcher`] downloads remote files for the bulk download command.

mod eagle;
mod fetch;

pub use eagle::EagleClient;
pub use fetch::HttpFetcher;
