//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid configuration. Fatal before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A note or input file does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more attachments could not be stored anywhere.
    #[error("Upload failed: {0}")]
    UploadFailed(String),
}

impl AppError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns the process exit code for this error (sysexits values).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 78,
            Self::NotFound(_) => 66,
            Self::UploadFailed(_) => 69,
        }
    }

    /// Returns the stable error code used in log output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UploadFailed(_) => "UPLOAD_FAILED",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Configuration(String::new()).exit_code(), 78);
        assert_eq!(AppError::NotFound(String::new()).exit_code(), 66);
        assert_eq!(AppError::UploadFailed(String::new()).exit_code(), 69);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Configuration(String::new()).error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::UploadFailed(String::new()).error_code(),
            "UPLOAD_FAILED"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::configuration("bucket is required").to_string(),
            "Configuration error: bucket is required"
        );
        assert_eq!(
            AppError::UploadFailed("cat.png".into()).to_string(),
            "Upload failed: cat.png"
        );
    }

    #[test]
    fn test_from_config_error() {
        let err: AppError = config::ConfigError::NotFound("vault.root".into()).into();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
