//! Seams between the pipeline and the storage backends.
//!
//! Each backend is a trait so the pipeline can be driven with in-memory
//! fakes in tests. The concrete services in this crate implement them.

use std::future::Future;
use std::path::PathBuf;

use bytes::Bytes;

use super::error::FetchError;
use crate::attachment::Attachment;
use crate::eagle::{EagleApi, EagleError, EagleService, ItemSource};
use crate::storage::{ObjectStoreService, StorageError};
use crate::vault::{VaultError, VaultService, VaultStored};

/// Object-store backend.
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `{folder}/{name}` and return the public URL.
    fn store(
        &self,
        attachment: &Attachment,
        folder: &str,
        name: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Returns true if `url` points into this store.
    fn owns(&self, url: &str) -> bool;
}

/// Local content tree backend.
pub trait LocalTree: Send + Sync {
    /// Store bytes under `folder`, deduplicating by content.
    fn store(
        &self,
        attachment: &Attachment,
        folder: &str,
        name: &str,
        seed: u64,
    ) -> impl Future<Output = Result<VaultStored, VaultError>> + Send;

    /// Read a file by tree-relative path.
    fn read(&self, path: &str) -> impl Future<Output = Result<Vec<u8>, VaultError>> + Send;

    /// Absolute filesystem path of a tree-relative path.
    fn absolute_path(&self, relative: &str) -> PathBuf;
}

/// Asset-manager backend. It never receives raw bytes.
pub trait AssetManager: Send + Sync {
    /// Register `source` under `folder_path` and return its location.
    fn store(
        &self,
        source: ItemSource,
        name: &str,
        folder_path: &str,
    ) -> impl Future<Output = Result<String, EagleError>> + Send;
}

/// A downloaded remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// Body.
    pub bytes: Bytes,
    /// Declared content type; empty if the server sent none.
    pub content_type: String,
}

/// Downloads remote files for the bulk download command.
pub trait RemoteFetcher: Send + Sync {
    /// Download `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Fetched, FetchError>> + Send;
}

impl ObjectStore for ObjectStoreService {
    async fn store(
        &self,
        attachment: &Attachment,
        folder: &str,
        name: &str,
    ) -> Result<String, StorageError> {
        ObjectStoreService::store(self, attachment, folder, name).await
    }

    fn owns(&self, url: &str) -> bool {
        self.public_url().owns(url)
    }
}

impl LocalTree for VaultService {
    async fn store(
        &self,
        attachment: &Attachment,
        folder: &str,
        name: &str,
        seed: u64,
    ) -> Result<VaultStored, VaultError> {
        VaultService::store(self, attachment, folder, name, seed).await
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, VaultError> {
        VaultService::read(self, path).await
    }

    fn absolute_path(&self, relative: &str) -> PathBuf {
        VaultService::absolute_path(self, relative)
    }
}

impl<A: EagleApi> AssetManager for EagleService<A> {
    async fn store(
        &self,
        source: ItemSource,
        name: &str,
        folder_path: &str,
    ) -> Result<String, EagleError> {
        EagleService::store(self, source, name, folder_path).await
    }
}
