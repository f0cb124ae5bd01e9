//! Upload orchestration.
//!
//! For one attachment the pipeline routes on the destination settings,
//! stores the bytes in the enabled backends with fallback, and renders the
//! embed markup for the best location. The batch commands apply the same
//! pipeline to many attachments in one note concurrently.

mod adapters;
mod batch;
mod document;
mod error;
mod pipeline;
mod types;

#[cfg(test)]
mod testing;

pub use adapters::{AssetManager, Fetched, LocalTree, ObjectStore, RemoteFetcher};
pub use batch::{BatchReport, JobReport, JobStatus, UploadJob};
pub use document::{
    DocumentBuffer, InMemoryDocument, Reference, ReferenceKind, Staged, error_marker,
    local_references, placeholder_for, remote_references, replace_first_in, stage,
};
pub use error::{DocumentError, FetchError, UploadError};
pub use pipeline::UploadPipeline;
pub use types::{Route, SkipReason, UploadNotice, UploadOutcome, UploadResult};
