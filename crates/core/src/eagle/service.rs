//! Asset-manager adapter implementation.

use tracing::{debug, info, warn};

use notedrop_shared::EagleConfig;

use super::api::{EagleApi, ItemSource, NewItem};
use super::error::EagleError;
use crate::folder::{FolderCreator, FolderResolver};

/// URI scheme marker of asset-manager locations.
pub const EAGLE_SCHEME: &str = "eagle://";

/// Location URI for an item id.
#[must_use]
pub fn item_uri(id: &str) -> String {
    format!("{EAGLE_SCHEME}item/{id}")
}

/// Asset-manager adapter.
pub struct EagleService<A: EagleApi> {
    api: A,
    tags: Vec<String>,
    annotation: String,
}

impl<A: EagleApi> EagleService<A> {
    /// Create a new adapter.
    #[must_use]
    pub fn new(api: A, config: &EagleConfig) -> Self {
        Self {
            api,
            tags: config.tags.clone(),
            annotation: config.annotation.clone(),
        }
    }

    /// Register `source` as a new item named `name` under `folder_path`.
    ///
    /// Returns the `eagle://item/{id}` location. If the service accepts the
    /// item without reporting its id, the item is looked up by name and
    /// folder before giving up.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be resolved, the request fails,
    /// or the created item cannot be found.
    pub async fn store(
        &self,
        source: ItemSource,
        name: &str,
        folder_path: &str,
    ) -> Result<String, EagleError> {
        let folder_id = self.resolve_folder(folder_path).await?;

        let item = NewItem {
            source,
            name: name.to_string(),
            tags: self.tags.clone(),
            folder_id,
            annotation: self.annotation.clone(),
        };

        let id = match self.api.add_item(&item).await? {
            Some(id) => id,
            None => {
                warn!(name, "asset manager omitted the item id; looking it up");
                self.api
                    .find_item(name, item.folder_id.as_deref())
                    .await?
                    .ok_or_else(|| EagleError::ItemNotFound {
                        name: name.to_string(),
                    })?
            }
        };

        info!(name, id = %id, "registered item with asset manager");
        Ok(item_uri(&id))
    }

    /// Resolve (creating as needed) the destination folder.
    ///
    /// An empty path means the library root.
    async fn resolve_folder(&self, folder_path: &str) -> Result<Option<String>, EagleError> {
        if folder_path.trim_matches('/').is_empty() {
            return Ok(None);
        }

        let roots = self.api.list_folders().await?;
        debug!(folder = folder_path, top_level = roots.len(), "fetched folder tree");

        FolderResolver::new(ApiFolders(&self.api))
            .resolve(&roots, folder_path, true)
            .await
            .map(|node| Some(node.id))
            .ok_or_else(|| EagleError::FolderUnavailable(folder_path.to_string()))
    }
}

/// Folder creation through the asset-manager API.
struct ApiFolders<'a, A>(&'a A);

impl<A: EagleApi> FolderCreator for ApiFolders<'_, A> {
    type Error = EagleError;

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, EagleError> {
        self.0.create_folder(name, parent_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::FolderNode;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock asset manager for testing.
    #[derive(Default)]
    struct MockEagle {
        folders: Vec<FolderNode>,
        omit_id: bool,
        lookup_hit: bool,
        created_folders: Mutex<Vec<(String, String)>>,
        items: Mutex<Vec<NewItem>>,
        lookups: Mutex<Vec<(String, Option<String>)>>,
    }

    impl EagleApi for MockEagle {
        async fn list_folders(&self) -> Result<Vec<FolderNode>, EagleError> {
            Ok(self.folders.clone())
        }

        async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, EagleError> {
            let mut created = self.created_folders.lock().unwrap();
            created.push((name.to_string(), parent_id.to_string()));
            Ok(format!("F{}", created.len()))
        }

        async fn add_item(&self, item: &NewItem) -> Result<Option<String>, EagleError> {
            self.items.lock().unwrap().push(item.clone());
            Ok((!self.omit_id).then(|| "ITEM1".to_string()))
        }

        async fn find_item(
            &self,
            name: &str,
            folder_id: Option<&str>,
        ) -> Result<Option<String>, EagleError> {
            self.lookups
                .lock()
                .unwrap()
                .push((name.to_string(), folder_id.map(str::to_string)));
            Ok(self.lookup_hit.then(|| "FOUND1".to_string()))
        }
    }

    fn service(mock: MockEagle) -> EagleService<MockEagle> {
        EagleService::new(mock, &EagleConfig::default())
    }

    #[tokio::test]
    async fn test_store_url_at_root() {
        let eagle = service(MockEagle::default());

        let uri = eagle
            .store(ItemSource::Url("https://cdn.example/x.png".into()), "x.png", "")
            .await
            .unwrap();

        assert_eq!(uri, "eagle://item/ITEM1");
        let items = eagle.api.items.lock().unwrap();
        assert_eq!(items[0].folder_id, None);
        assert_eq!(items[0].tags, vec!["notedrop".to_string()]);
        assert!(eagle.api.created_folders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_resolves_existing_folder() {
        let eagle = service(MockEagle {
            folders: vec![FolderNode::new("notes", "Notes", "")],
            ..MockEagle::default()
        });

        eagle
            .store(ItemSource::Path(PathBuf::from("/v/a.png")), "a.png", "Notes")
            .await
            .unwrap();

        let items = eagle.api.items.lock().unwrap();
        assert_eq!(items[0].folder_id.as_deref(), Some("notes"));
        assert!(eagle.api.created_folders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_creates_missing_folders() {
        let eagle = service(MockEagle {
            folders: vec![FolderNode::new("notes", "Notes", "")],
            ..MockEagle::default()
        });

        eagle
            .store(ItemSource::Url("https://x/a.png".into()), "a.png", "Notes/2024/March")
            .await
            .unwrap();

        let created = eagle.api.created_folders.lock().unwrap().clone();
        assert_eq!(
            created,
            vec![
                ("2024".to_string(), "notes".to_string()),
                ("March".to_string(), "F1".to_string()),
            ]
        );
        let items = eagle.api.items.lock().unwrap();
        assert_eq!(items[0].folder_id.as_deref(), Some("F2"));
    }

    #[tokio::test]
    async fn test_missing_id_falls_back_to_lookup() {
        let eagle = service(MockEagle {
            folders: vec![FolderNode::new("notes", "Notes", "")],
            omit_id: true,
            lookup_hit: true,
            ..MockEagle::default()
        });

        let uri = eagle
            .store(ItemSource::Url("https://x/a.png".into()), "a.png", "Notes")
            .await
            .unwrap();

        assert_eq!(uri, "eagle://item/FOUND1");
        let lookups = eagle.api.lookups.lock().unwrap();
        assert_eq!(
            lookups[0],
            ("a.png".to_string(), Some("notes".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_id_and_failed_lookup_is_an_error() {
        let eagle = service(MockEagle {
            omit_id: true,
            ..MockEagle::default()
        });

        let err = eagle
            .store(ItemSource::Url("https://x/a.png".into()), "a.png", "")
            .await
            .unwrap_err();

        assert!(matches!(err, EagleError::ItemNotFound { .. }));
    }

    #[test]
    fn test_item_uri() {
        assert_eq!(item_uri("42"), "eagle://item/42");
        assert!(item_uri("42").starts_with(EAGLE_SCHEME));
    }
}
