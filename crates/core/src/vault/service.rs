//! Local-tree adapter implementation using the OpenDAL filesystem service.

use std::path::{Path, PathBuf};

use opendal::{ErrorKind, Operator, services};
use tracing::{debug, info};

use notedrop_shared::VaultConfig;

use super::error::VaultError;
use crate::attachment::Attachment;
use crate::naming::{content_digest, split_extension};

/// Where an attachment landed in the local tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultStored {
    /// Tree-relative path, `/`-separated.
    pub path: String,
    /// False when an identical file already existed and nothing was written.
    pub written: bool,
}

/// Local-tree adapter.
#[derive(Debug, Clone)]
pub struct VaultService {
    operator: Operator,
    root: PathBuf,
}

impl VaultService {
    /// Create an adapter rooted at the configured directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not valid UTF-8 or the operator cannot
    /// be initialized.
    pub fn from_config(config: &VaultConfig) -> Result<Self, VaultError> {
        let root = config
            .root
            .to_str()
            .ok_or_else(|| VaultError::configuration("vault root is not valid UTF-8"))?;
        let operator = Operator::new(services::Fs::default().root(root))
            .map_err(|e| VaultError::configuration(e.to_string()))?
            .finish();

        Ok(Self {
            operator,
            root: config.root.clone(),
        })
    }

    /// Create an adapter over an existing operator.
    #[must_use]
    pub fn with_operator(operator: Operator, root: impl Into<PathBuf>) -> Self {
        Self {
            operator,
            root: root.into(),
        }
    }

    /// Root directory of the tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize a tree-relative path, rejecting anything that escapes the root.
    ///
    /// # Errors
    ///
    /// Returns an error for empty paths and `.`/`..` segments.
    pub fn normalize(path: &str) -> Result<String, VaultError> {
        let segments: Vec<&str> = path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if segments.is_empty() || segments.contains(&"..") {
            return Err(VaultError::invalid_path(path));
        }
        Ok(segments.join("/"))
    }

    /// Absolute filesystem path for a tree-relative path.
    #[must_use]
    pub fn absolute_path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Read a file from the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the file cannot be read.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>, VaultError> {
        let path = Self::normalize(path)?;
        match self.operator.read(&path).await {
            Ok(buffer) => Ok(buffer.to_vec()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(VaultError::NotFound { path }),
            Err(e) => Err(e.into()),
        }
    }

    /// Store an attachment as `folder/name`, deduplicating by content.
    ///
    /// If a file already exists at the target it is read back and compared
    /// by seeded digest. Identical content returns the existing path without
    /// writing; different content retries with `{stem}-1{ext}`,
    /// `{stem}-2{ext}`, ... until a free or identical slot is found.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is invalid or any filesystem call fails.
    pub async fn store(
        &self,
        attachment: &Attachment,
        folder: &str,
        name: &str,
        seed: u64,
    ) -> Result<VaultStored, VaultError> {
        let folder = folder.trim_matches('/');
        let (stem, extension) = split_extension(name);
        let digest = content_digest(seed, attachment.data());

        let mut suffix: u64 = 0;
        loop {
            let candidate = match (suffix, extension) {
                (0, _) => name.to_string(),
                (n, Some(ext)) => format!("{stem}-{n}.{ext}"),
                (n, None) => format!("{stem}-{n}"),
            };
            let path = Self::normalize(&format!("{folder}/{candidate}"))?;

            if !self.is_file(&path).await? {
                self.ensure_folder(folder).await?;
                self.operator
                    .write(&path, attachment.data().clone())
                    .await
                    .map_err(VaultError::from)?;
                info!(path = %path, size = attachment.len(), "stored file in local tree");
                return Ok(VaultStored {
                    path,
                    written: true,
                });
            }

            let existing = self.operator.read(&path).await.map_err(VaultError::from)?;
            if content_digest(seed, &existing.to_vec()) == digest {
                debug!(path = %path, "identical file already in local tree");
                return Ok(VaultStored {
                    path,
                    written: false,
                });
            }

            debug!(path = %path, "name taken by different content; trying next suffix");
            suffix += 1;
        }
    }

    async fn is_file(&self, path: &str) -> Result<bool, VaultError> {
        match self.operator.stat(path).await {
            Ok(meta) => Ok(!meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_folder(&self, folder: &str) -> Result<(), VaultError> {
        if folder.is_empty() || !self.operator.info().full_capability().create_dir {
            return Ok(());
        }
        self.operator
            .create_dir(&format!("{folder}/"))
            .await
            .map_err(VaultError::from)
    }
}
