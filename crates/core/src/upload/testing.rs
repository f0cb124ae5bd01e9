//! In-memory backends for pipeline tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use bytes::Bytes;
use chrono::NaiveDate;

use notedrop_shared::{BackendToggles, DestinationSettings, NamingMode, NamingSettings};

use super::adapters::{AssetManager, Fetched, LocalTree, ObjectStore, RemoteFetcher};
use super::error::FetchError;
use super::pipeline::UploadPipeline;
use crate::attachment::Attachment;
use crate::eagle::{EagleError, ItemSource};
use crate::storage::StorageError;
use crate::vault::{VaultError, VaultStored};

pub const CDN: &str = "https://cdn.example";

#[derive(Default)]
pub struct FakeStore {
    pub fail: bool,
    pub reject: Option<&'static str>,
    pub keys: Mutex<Vec<String>>,
}

impl ObjectStore for FakeStore {
    async fn store(
        &self,
        _attachment: &Attachment,
        folder: &str,
        name: &str,
    ) -> Result<String, StorageError> {
        if self.fail || self.reject == Some(name) {
            return Err(StorageError::operation("connection reset"));
        }
        let key = format!("{folder}/{name}");
        self.keys.lock().unwrap().push(key.clone());
        Ok(format!("{CDN}/{key}"))
    }

    fn owns(&self, url: &str) -> bool {
        url.starts_with(CDN)
    }
}

#[derive(Default)]
pub struct FakeTree {
    pub fail: bool,
    pub files: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeTree {
    pub fn with_file(self, path: &str, bytes: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        self
    }

    pub fn has(&self, path: &str) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

impl LocalTree for FakeTree {
    async fn store(
        &self,
        attachment: &Attachment,
        folder: &str,
        name: &str,
        _seed: u64,
    ) -> Result<VaultStored, VaultError> {
        if self.fail {
            return Err(VaultError::Operation("disk full".to_string()));
        }
        let path = format!("{folder}/{name}");
        self.files
            .lock()
            .unwrap()
            .insert(path.clone(), attachment.data().to_vec());
        Ok(VaultStored {
            path,
            written: true,
        })
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, VaultError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| VaultError::NotFound {
                path: path.to_string(),
            })
    }

    fn absolute_path(&self, relative: &str) -> PathBuf {
        PathBuf::from("/vault").join(relative)
    }
}

#[derive(Default)]
pub struct FakeEagle {
    pub fail: bool,
    pub sources: Mutex<Vec<ItemSource>>,
}

impl AssetManager for FakeEagle {
    async fn store(
        &self,
        source: ItemSource,
        _name: &str,
        _folder_path: &str,
    ) -> Result<String, EagleError> {
        if self.fail {
            return Err(EagleError::Status { status: 500 });
        }
        self.sources.lock().unwrap().push(source);
        Ok("eagle://item/42".to_string())
    }
}

/// Serves a fixed PNG for every URL except those containing `missing`.
pub struct FakeFetcher;

impl RemoteFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        if url.contains("missing") {
            return Err(FetchError::Status { status: 404 });
        }
        Ok(Fetched {
            bytes: Bytes::from_static(b"\x89PNG"),
            content_type: "image/png".to_string(),
        })
    }
}

pub type FakePipeline = UploadPipeline<FakeStore, FakeTree, FakeEagle>;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
}

/// Sanitized names and fixed folders so locations are predictable.
pub fn settings(backends: BackendToggles) -> DestinationSettings {
    DestinationSettings {
        backends,
        naming: NamingSettings {
            mode: NamingMode::Sanitize,
            seed: Some(7),
        },
        ..DestinationSettings::default()
    }
}

pub fn png(name: &str) -> Attachment {
    Attachment::new(Bytes::from_static(b"\x89PNG"), "image/png", name)
}
