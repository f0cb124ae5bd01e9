//! Object-store adapter implementation using Apache OpenDAL.

use opendal::{ErrorKind, Metadata, Operator, services};
use tracing::{debug, info, warn};

use notedrop_shared::ObjectStoreConfig;

use super::error::StorageError;
use super::url::PublicUrl;
use crate::attachment::Attachment;

/// Object-store adapter for attachments.
#[derive(Debug, Clone)]
pub struct ObjectStoreService {
    operator: Operator,
    public_url: PublicUrl,
}

impl ObjectStoreService {
    /// Create a new object-store adapter from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: &ObjectStoreConfig) -> Result<Self, StorageError> {
        let public_url = PublicUrl::from_config(config)?;
        let operator = Self::create_operator(config)?;
        Ok(Self {
            operator,
            public_url,
        })
    }

    /// Create an adapter over an existing operator.
    #[must_use]
    pub fn with_operator(operator: Operator, public_url: PublicUrl) -> Self {
        Self {
            operator,
            public_url,
        }
    }

    /// Create OpenDAL S3 operator from config.
    fn create_operator(config: &ObjectStoreConfig) -> Result<Operator, StorageError> {
        let mut builder = services::S3::default()
            .endpoint(&config.endpoint)
            .bucket(&config.bucket)
            .access_key_id(&config.access_key_id)
            .secret_access_key(&config.secret_access_key)
            .region(&config.region);
        if !config.path_style {
            builder = builder.enable_virtual_host_style();
        }

        Ok(Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish())
    }

    /// Generate the object key for a name inside a folder.
    ///
    /// Format: `{folder}/{name}`, or `{name}` when the folder is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains a slash.
    pub fn object_key(folder: &str, name: &str) -> Result<String, StorageError> {
        if name.is_empty() || name.contains('/') {
            return Err(StorageError::InvalidKey(name.to_string()));
        }
        let folder = folder.trim_matches('/');
        if folder.is_empty() {
            Ok(name.to_string())
        } else {
            Ok(format!("{folder}/{name}"))
        }
    }

    /// Check if an object exists.
    ///
    /// Best-effort: a failed check is logged and reported as absent.
    pub async fn exists(&self, key: &str) -> bool {
        is_present(key, &self.operator.stat(key).await)
    }

    /// Store an attachment under `folder/name` and return its public URL.
    ///
    /// The write is skipped when the key already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    pub async fn store(
        &self,
        attachment: &Attachment,
        folder: &str,
        name: &str,
    ) -> Result<String, StorageError> {
        let key = Self::object_key(folder, name)?;

        if self.exists(&key).await {
            debug!(key = %key, "object already present; skipping write");
            return Ok(self.public_url.url_for(&key));
        }

        let mut write = self.operator.write_with(&key, attachment.data().clone());
        let content_type = attachment.content_type();
        if !content_type.is_empty()
            && self
                .operator
                .info()
                .full_capability()
                .write_with_content_type
        {
            write = write.content_type(content_type);
        }
        write.await.map_err(StorageError::from)?;

        info!(key = %key, size = attachment.len(), "stored object");
        Ok(self.public_url.url_for(&key))
    }

    /// Get the public URL builder.
    #[must_use]
    pub fn public_url(&self) -> &PublicUrl {
        &self.public_url
    }
}

/// Interpret a stat result. Any failure other than "not found" is logged and
/// treated as absent so the caller goes ahead with the write.
fn is_present(key: &str, stat: &Result<Metadata, opendal::Error>) -> bool {
    match stat {
        Ok(_) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!(key, error = %e, "existence check failed; assuming absent");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UrlStyle;
    use opendal::EntryMode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn memory_service() -> ObjectStoreService {
        let operator = Operator::new(services::Memory::default())
            .expect("memory operator")
            .finish();
        let public_url =
            PublicUrl::new("https://s3.example.com", "notes", UrlStyle::Subdomain).unwrap();
        ObjectStoreService::with_operator(operator, public_url)
    }

    #[test]
    fn test_object_key() {
        assert_eq!(
            ObjectStoreService::object_key("2024/03/", "cat.png").unwrap(),
            "2024/03/cat.png"
        );
        assert_eq!(
            ObjectStoreService::object_key("", "cat.png").unwrap(),
            "cat.png"
        );
        assert!(ObjectStoreService::object_key("img", "").is_err());
        assert!(ObjectStoreService::object_key("img", "a/b.png").is_err());
    }

    #[test]
    fn test_from_config_rejects_bad_endpoint() {
        let config = s3_config("https://".to_string());
        let err = ObjectStoreService::from_config(&config).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_store_writes_and_returns_public_url() {
        let service = memory_service();
        let attachment = Attachment::new(b"pixels".to_vec(), "image/png", "cat.png");

        let url = service.store(&attachment, "img", "my cat.png").await.unwrap();

        assert_eq!(url, "https://notes.s3.example.com/img/my%20cat.png");
        assert!(service.exists("img/my cat.png").await);
        let stored = service.operator.read("img/my cat.png").await.unwrap();
        assert_eq!(stored.to_vec(), b"pixels".to_vec());
    }

    #[tokio::test]
    async fn test_store_skips_existing_key() {
        let service = memory_service();
        let first = Attachment::new(b"first".to_vec(), "image/png", "a.png");
        let second = Attachment::new(b"second".to_vec(), "image/png", "a.png");

        let url1 = service.store(&first, "", "a.png").await.unwrap();
        let url2 = service.store(&second, "", "a.png").await.unwrap();

        assert_eq!(url1, url2);
        // the existing object was not overwritten
        let stored = service.operator.read("a.png").await.unwrap();
        assert_eq!(stored.to_vec(), b"first".to_vec());
    }

    #[tokio::test]
    async fn test_exists_false_for_missing() {
        let service = memory_service();
        assert!(!service.exists("nope.png").await);
    }

    #[test]
    fn test_failed_stat_counts_as_absent() {
        let found = Ok(Metadata::new(EntryMode::FILE));
        let missing = Err(opendal::Error::new(ErrorKind::NotFound, "no such key"));
        let broken = Err(opendal::Error::new(ErrorKind::Unexpected, "503 slow down"));

        assert!(is_present("a.png", &found));
        assert!(!is_present("a.png", &missing));
        assert!(!is_present("a.png", &broken));
    }

    fn s3_config(endpoint: String) -> ObjectStoreConfig {
        ObjectStoreConfig {
            endpoint,
            bucket: "notes".to_string(),
            region: "auto".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            path_style: true,
            custom_url: None,
        }
    }

    #[tokio::test]
    async fn test_store_writes_when_existence_check_errors() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/notes/img/cat.png"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/notes/img/cat.png"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let service = ObjectStoreService::from_config(&s3_config(server.uri())).unwrap();
        let attachment = Attachment::new(b"pixels".to_vec(), "image/png", "cat.png");

        let url = service.store(&attachment, "img", "cat.png").await.unwrap();

        assert_eq!(url, format!("{}/notes/img/cat.png", server.uri()));
    }
}
