//! Public URL composition.

use notedrop_shared::ObjectStoreConfig;

use super::error::StorageError;

/// How public URLs address the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlStyle {
    /// `scheme://bucket.host/key`
    Subdomain,
    /// `scheme://host/bucket/key`
    Path,
    /// `{base}/key`
    Custom(String),
}

/// Builds the public read URL for an object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl {
    scheme: String,
    host: String,
    bucket: String,
    style: UrlStyle,
}

impl PublicUrl {
    /// Create a URL builder from an endpoint such as `https://s3.example.com`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint has no host.
    pub fn new(endpoint: &str, bucket: &str, style: UrlStyle) -> Result<Self, StorageError> {
        let (scheme, rest) = endpoint
            .split_once("://")
            .unwrap_or(("https", endpoint));
        let host = rest.trim_end_matches('/');
        if host.is_empty() {
            return Err(StorageError::configuration(format!(
                "endpoint '{endpoint}' has no host"
            )));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            bucket: bucket.to_string(),
            style,
        })
    }

    /// Create a URL builder from object-store configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint has no host.
    pub fn from_config(config: &ObjectStoreConfig) -> Result<Self, StorageError> {
        let style = match config.custom_url.as_deref().map(str::trim) {
            Some(custom) if !custom.is_empty() => UrlStyle::Custom(custom.to_string()),
            _ if config.path_style => UrlStyle::Path,
            _ => UrlStyle::Subdomain,
        };
        Self::new(&config.endpoint, &config.bucket, style)
    }

    /// URL prefix every object URL starts with (no trailing slash).
    #[must_use]
    pub fn base(&self) -> String {
        match &self.style {
            UrlStyle::Subdomain => format!("{}://{}.{}", self.scheme, self.bucket, self.host),
            UrlStyle::Path => format!("{}://{}/{}", self.scheme, self.host, self.bucket),
            UrlStyle::Custom(base) => base.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL for `key`, with spaces percent-escaped.
    #[must_use]
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base(), key.trim_start_matches('/')).replace(' ', "%20")
    }

    /// Returns true if `url` points into this bucket.
    #[must_use]
    pub fn owns(&self, url: &str) -> bool {
        url.starts_with(&format!("{}/", self.base()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_style() {
        let url = PublicUrl::new("https://s3.example.com/", "notes", UrlStyle::Subdomain).unwrap();
        assert_eq!(
            url.url_for("2024/03/cat.png"),
            "https://notes.s3.example.com/2024/03/cat.png"
        );
    }

    #[test]
    fn test_path_style() {
        let url = PublicUrl::new("http://minio.local:9000", "notes", UrlStyle::Path).unwrap();
        assert_eq!(
            url.url_for("img/cat.png"),
            "http://minio.local:9000/notes/img/cat.png"
        );
    }

    #[test]
    fn test_custom_style_and_space_escaping() {
        let url = PublicUrl::new(
            "https://s3.example.com",
            "notes",
            UrlStyle::Custom("https://cdn.example/".to_string()),
        )
        .unwrap();
        assert_eq!(url.url_for("my file.png"), "https://cdn.example/my%20file.png");
    }

    #[test]
    fn test_endpoint_without_scheme_defaults_to_https() {
        let url = PublicUrl::new("s3.example.com", "b", UrlStyle::Subdomain).unwrap();
        assert_eq!(url.base(), "https://b.s3.example.com");
    }

    #[test]
    fn test_endpoint_without_host_is_rejected() {
        let err = PublicUrl::new("https://", "b", UrlStyle::Path).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn test_owns() {
        let url = PublicUrl::new("https://s3.example.com", "notes", UrlStyle::Path).unwrap();
        assert!(url.owns("https://s3.example.com/notes/a.png"));
        assert!(!url.owns("https://s3.example.com/notes-other/a.png"));
        assert!(!url.owns("https://elsewhere.example/a.png"));
    }
}
