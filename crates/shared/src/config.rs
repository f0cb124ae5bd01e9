//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::settings::{DestinationSettings, NamingMode};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Object-store (S3-compatible) backend configuration.
    #[serde(default)]
    pub object_store: Option<ObjectStoreConfig>,
    /// Local content tree configuration.
    #[serde(default)]
    pub vault: Option<VaultConfig>,
    /// Asset-manager (Eagle) configuration.
    #[serde(default)]
    pub eagle: Option<EagleConfig>,
    /// Destination settings applied to every upload.
    #[serde(default)]
    pub destinations: DestinationSettings,
}

/// Object-store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreConfig {
    /// S3 endpoint URL, e.g. `https://s3.us-east-1.amazonaws.com`.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Compose public URLs as `scheme://host/bucket/key` instead of
    /// `scheme://bucket.host/key`.
    #[serde(default)]
    pub path_style: bool,
    /// Custom content URL; when set public URLs are `{custom_url}/{key}`.
    #[serde(default)]
    pub custom_url: Option<String>,
}

fn default_region() -> String {
    "auto".to_string()
}

/// Local content tree configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    /// Absolute root of the tree.
    pub root: PathBuf,
}

/// Asset-manager configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EagleConfig {
    /// Base URL of the local API service.
    #[serde(default = "default_eagle_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_eagle_timeout")]
    pub timeout_secs: u64,
    /// Annotation attached to every created item.
    #[serde(default = "default_annotation")]
    pub annotation: String,
    /// Provenance tags attached to every created item.
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
}

fn default_eagle_url() -> String {
    "http://localhost:41595".to_string()
}

fn default_eagle_timeout() -> u64 {
    10
}

fn default_annotation() -> String {
    "Uploaded by notedrop".to_string()
}

fn default_tags() -> Vec<String> {
    vec!["notedrop".to_string()]
}

impl Default for EagleConfig {
    fn default() -> Self {
        Self {
            base_url: default_eagle_url(),
            timeout_secs: default_eagle_timeout(),
            annotation: default_annotation(),
            tags: default_tags(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("NOTEDROP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("eagle.tags")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Checks that every enabled backend has the configuration it needs.
    ///
    /// This runs before any network call; a failure here is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] naming the first missing value.
    pub fn validate(&self) -> AppResult<()> {
        let backends = &self.destinations.backends;

        if backends.object_store {
            let store = self
                .object_store
                .as_ref()
                .ok_or_else(|| {
                    AppError::configuration("object store is enabled but not configured")
                })?;
            require("object_store.endpoint", &store.endpoint)?;
            require("object_store.bucket", &store.bucket)?;
            require("object_store.access_key_id", &store.access_key_id)?;
            require("object_store.secret_access_key", &store.secret_access_key)?;
        }

        if backends.local_tree || self.destinations.local_only {
            let vault = self
                .vault
                .as_ref()
                .ok_or_else(|| {
                    AppError::configuration("local tree is enabled but not configured")
                })?;
            if !vault.root.is_absolute() {
                return Err(AppError::configuration(format!(
                    "vault.root must be absolute, got {}",
                    vault.root.display()
                )));
            }
        }

        if backends.asset_manager {
            let eagle = self
                .eagle
                .as_ref()
                .ok_or_else(|| {
                    AppError::configuration("asset manager is enabled but not configured")
                })?;
            require("eagle.base_url", &eagle.base_url)?;
        }

        let naming = &self.destinations.naming;
        if naming.mode == NamingMode::Hash && naming.seed.is_none() {
            return Err(AppError::configuration(
                "destinations.naming.seed is required in hash mode; \
                 generate one with `notedrop new-seed`",
            ));
        }

        Ok(())
    }
}

fn require(key: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::configuration(format!("{key} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BackendToggles, NamingSettings};

    fn s3() -> ObjectStoreConfig {
        ObjectStoreConfig {
            endpoint: "https://s3.example.com".to_string(),
            bucket: "notes".to_string(),
            region: default_region(),
            access_key_id: "AKIA".to_string(),
            secret_access_key: "secret".to_string(),
            path_style: false,
            custom_url: None,
        }
    }

    fn config_with(backends: BackendToggles) -> AppConfig {
        AppConfig {
            object_store: None,
            vault: None,
            eagle: None,
            destinations: DestinationSettings {
                backends,
                naming: NamingSettings {
                    mode: NamingMode::Hash,
                    seed: Some(42),
                },
                ..DestinationSettings::default()
            },
        }
    }

    #[test]
    fn test_validate_hash_mode_requires_seed() {
        let mut config = config_with(BackendToggles::none());
        config.destinations.naming.seed = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("destinations.naming.seed is required"));

        config.destinations.naming.mode = NamingMode::Sanitize;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_seed_is_read_from_config() {
        temp_env::with_var("NOTEDROP__DESTINATIONS__NAMING__SEED", Some("987654321"), || {
            let first = AppConfig::load().expect("config should load");
            let second = AppConfig::load().expect("config should load");
            assert_eq!(first.destinations.naming.seed, Some(987_654_321));
            assert_eq!(first.destinations.naming, second.destinations.naming);
        });
    }

    #[test]
    fn test_validate_nothing_enabled() {
        let config = config_with(BackendToggles::none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_object_store_section() {
        let config = config_with(BackendToggles {
            object_store: true,
            ..BackendToggles::none()
        });
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_validate_empty_secret() {
        let mut config = config_with(BackendToggles {
            object_store: true,
            ..BackendToggles::none()
        });
        config.object_store = Some(ObjectStoreConfig {
            secret_access_key: "  ".to_string(),
            ..s3()
        });
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: object_store.secret_access_key is required"
        );
    }

    #[test]
    fn test_validate_relative_vault_root() {
        let mut config = config_with(BackendToggles {
            local_tree: true,
            ..BackendToggles::none()
        });
        config.vault = Some(VaultConfig {
            root: PathBuf::from("relative/vault"),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_all_configured() {
        let mut config = config_with(BackendToggles {
            object_store: true,
            local_tree: true,
            asset_manager: true,
        });
        config.object_store = Some(s3());
        config.vault = Some(VaultConfig {
            root: std::env::temp_dir(),
        });
        config.eagle = Some(EagleConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("NOTEDROP__VAULT__ROOT", Some("/srv/vault")),
                ("NOTEDROP__EAGLE__BASE_URL", Some("http://127.0.0.1:41595")),
                ("NOTEDROP__DESTINATIONS__LOCAL_FOLDER", Some("files/${year}")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(
                    config.vault.map(|v| v.root),
                    Some(PathBuf::from("/srv/vault"))
                );
                let eagle = config.eagle.expect("eagle section");
                assert_eq!(eagle.base_url, "http://127.0.0.1:41595");
                assert_eq!(eagle.timeout_secs, 10);
                assert_eq!(config.destinations.local_folder.as_str(), "files/${year}");
            },
        );
    }
}
