//! A note file edited in place.

use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use notedrop_core::upload::{DocumentBuffer, DocumentError, replace_first_in};

/// Note backed by a file. Every mutation is written through while the
/// buffer lock is held, so concurrent jobs never interleave writes.
#[derive(Debug)]
pub struct FileDocument {
    path: PathBuf,
    text: Mutex<String>,
}

impl FileDocument {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = tokio::fs::read_to_string(&path).await?;
        Ok(Self {
            path,
            text: Mutex::new(text),
        })
    }

    async fn persist(&self, text: &str) -> Result<(), DocumentError> {
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| DocumentError::Io(format!("{}: {e}", self.path.display())))
    }
}

impl DocumentBuffer for FileDocument {
    async fn read(&self) -> Result<String, DocumentError> {
        Ok(self.text.lock().await.clone())
    }

    async fn replace_first(&self, from: &str, to: &str) -> Result<bool, DocumentError> {
        let mut text = self.text.lock().await;
        let mut updated = text.clone();
        if !replace_first_in(&mut updated, from, to) {
            return Ok(false);
        }
        self.persist(&updated).await?;
        *text = updated;
        Ok(true)
    }

    async fn write(&self, new_text: String) -> Result<(), DocumentError> {
        let mut text = self.text.lock().await;
        self.persist(&new_text).await?;
        *text = new_text;
        Ok(())
    }
}
