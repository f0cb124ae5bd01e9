//! Routing, fan-out and fallback for a single attachment.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use notedrop_shared::{BackendToggles, DestinationSettings};

use super::adapters::{AssetManager, LocalTree, ObjectStore};
use super::error::UploadError;
use super::types::{Route, SkipReason, UploadNotice, UploadOutcome, UploadResult};
use crate::attachment::{Attachment, AttachmentOrigin};
use crate::backend::Backend;
use crate::eagle::ItemSource;
use crate::embed::{ContentCategory, Embed};
use crate::naming::candidate_name;

/// Drives one attachment through the enabled backends.
///
/// Adapters are optional; enabling a backend that has no adapter is a
/// configuration error reported before any backend is called.
pub struct UploadPipeline<S, V, E> {
    pub(super) object_store: Option<S>,
    pub(super) local_tree: Option<V>,
    pub(super) asset_manager: Option<E>,
}

impl<S, V, E> Default for UploadPipeline<S, V, E> {
    fn default() -> Self {
        Self {
            object_store: None,
            local_tree: None,
            asset_manager: None,
        }
    }
}

impl<S, V, E> UploadPipeline<S, V, E>
where
    S: ObjectStore,
    V: LocalTree,
    E: AssetManager,
{
    /// Create a pipeline with no adapters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the object-store adapter.
    #[must_use]
    pub fn with_object_store(mut self, adapter: S) -> Self {
        self.object_store = Some(adapter);
        self
    }

    /// Attach the local-tree adapter.
    #[must_use]
    pub fn with_local_tree(mut self, adapter: V) -> Self {
        self.local_tree = Some(adapter);
        self
    }

    /// Attach the asset-manager adapter.
    #[must_use]
    pub fn with_asset_manager(mut self, adapter: E) -> Self {
        self.asset_manager = Some(adapter);
        self
    }

    /// Decide what to do with `attachment` under `settings`.
    pub fn route(&self, attachment: &Attachment, settings: &DestinationSettings) -> Route {
        if attachment.origin() == AttachmentOrigin::Drop && !settings.drag_upload {
            return Route::Skip(SkipReason::DragUploadDisabled);
        }
        if settings.local_only {
            return Route::LocalOnly;
        }
        if !settings.backends.any() {
            return Route::Skip(SkipReason::NothingEnabled);
        }
        Route::Backends(settings.backends)
    }

    /// Store `attachment` in every enabled backend and render its markup.
    ///
    /// Object store and local tree run concurrently. The asset manager runs
    /// afterwards because it ingests a location the others produced, and
    /// prefers the object-store URL over the local path.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Configuration`] if an enabled backend has no
    /// adapter, and [`UploadError::AllBackendsFailed`] if nothing was stored.
    pub async fn upload(
        &self,
        attachment: &Attachment,
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> Result<UploadOutcome, UploadError> {
        let route = self.route(attachment, settings);
        debug!(
            file = attachment.original_name(),
            origin = attachment.origin().as_str(),
            route = ?route,
            "routed attachment"
        );

        match route {
            Route::Skip(reason) => Ok(UploadOutcome::Skipped(reason)),
            Route::LocalOnly => self.upload_local_only(attachment, settings, today).await,
            Route::Backends(enabled) => {
                self.upload_to(enabled, attachment, None, settings, today)
                    .await
            }
        }
    }

    /// Upload an attachment that already lives in the local tree at
    /// `local_path`.
    ///
    /// The local tree is never written. The asset manager ingests the
    /// existing file when there is no object-store URL, and the existing
    /// path is the fallback embed location.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Configuration`] if an enabled backend has no
    /// adapter, and [`UploadError::AllBackendsFailed`] if no remote backend
    /// accepted the file.
    pub async fn upload_stored(
        &self,
        attachment: &Attachment,
        local_path: &str,
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> Result<UploadOutcome, UploadError> {
        match self.route(attachment, settings) {
            Route::Skip(reason) => Ok(UploadOutcome::Skipped(reason)),
            Route::LocalOnly => Ok(UploadOutcome::LocalOnly(UploadResult {
                local_path: Some(local_path.to_string()),
                ..UploadResult::default()
            })),
            Route::Backends(mut enabled) => {
                enabled.local_tree = false;
                self.upload_to(enabled, attachment, Some(local_path), settings, today)
                    .await
            }
        }
    }

    async fn upload_local_only(
        &self,
        attachment: &Attachment,
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> Result<UploadOutcome, UploadError> {
        let vault = self
            .local_tree
            .as_ref()
            .ok_or_else(|| UploadError::configuration("local-only mode requires the local tree"))?;
        let name = candidate_name(attachment, &settings.naming);

        match vault
            .store(
                attachment,
                &settings.local_folder.render(today),
                &name,
                settings.naming.digest_seed(),
            )
            .await
        {
            Ok(stored) => {
                info!(path = %stored.path, "stored attachment locally only");
                Ok(UploadOutcome::LocalOnly(UploadResult {
                    local_path: Some(stored.path),
                    ..UploadResult::default()
                }))
            }
            Err(err) => Err(UploadError::AllBackendsFailed {
                file: attachment.original_name().to_string(),
                notices: vec![UploadNotice::failed(Backend::LocalTree, &err)],
            }),
        }
    }

    fn check_adapters(&self, enabled: BackendToggles) -> Result<(), UploadError> {
        if enabled.object_store && self.object_store.is_none() {
            return Err(UploadError::configuration(
                "object store is enabled but not configured",
            ));
        }
        if enabled.local_tree && self.local_tree.is_none() {
            return Err(UploadError::configuration(
                "local tree is enabled but not configured",
            ));
        }
        if enabled.asset_manager && self.asset_manager.is_none() {
            return Err(UploadError::configuration(
                "asset manager is enabled but not configured",
            ));
        }
        Ok(())
    }

    async fn upload_to(
        &self,
        enabled: BackendToggles,
        attachment: &Attachment,
        existing: Option<&str>,
        settings: &DestinationSettings,
        today: NaiveDate,
    ) -> Result<UploadOutcome, UploadError> {
        self.check_adapters(enabled)?;

        if enabled.asset_manager
            && !enabled.object_store
            && !enabled.local_tree
            && existing.is_none()
        {
            warn!("asset manager is the only enabled backend; it cannot receive raw bytes");
        }

        let name = candidate_name(attachment, &settings.naming);
        let store_folder = settings.object_store_folder.render(today);
        let local_folder = settings.local_folder.render(today);

        let object_store = async {
            match (&self.object_store, enabled.object_store) {
                (Some(store), true) => Some(store.store(attachment, &store_folder, &name).await),
                _ => None,
            }
        };
        let local_tree = async {
            match (&self.local_tree, enabled.local_tree) {
                (Some(vault), true) => Some(
                    vault
                        .store(attachment, &local_folder, &name, settings.naming.digest_seed())
                        .await,
                ),
                _ => None,
            }
        };
        let (stored_remote, stored_local) = tokio::join!(object_store, local_tree);

        let mut result = UploadResult::default();
        let mut notices = Vec::new();

        match stored_remote {
            Some(Ok(url)) => result.object_store_url = Some(url),
            Some(Err(err)) => {
                warn!(file = %name, error = %err, "object store upload failed");
                notices.push(UploadNotice::failed(Backend::ObjectStore, &err));
            }
            None => {}
        }
        match stored_local {
            Some(Ok(stored)) => result.local_path = Some(stored.path),
            Some(Err(err)) => {
                warn!(file = %name, error = %err, "local tree write failed");
                notices.push(UploadNotice::failed(Backend::LocalTree, &err));
            }
            None => {}
        }

        if enabled.asset_manager
            && let Some(eagle) = &self.asset_manager
        {
            match self.asset_source(&result, existing) {
                Some(source) => {
                    let folder = settings.asset_manager_folder.render(today);
                    match eagle.store(source, &name, &folder).await {
                        Ok(uri) => result.asset_manager_uri = Some(uri),
                        Err(err) => {
                            warn!(file = %name, error = %err, "asset manager registration failed");
                            notices.push(UploadNotice::failed(Backend::AssetManager, &err));
                        }
                    }
                }
                None => notices.push(UploadNotice::new(
                    Some(Backend::AssetManager),
                    "skipped: no object-store URL or local path to ingest",
                )),
            }
        }

        let stored = !result.is_empty();
        if result.local_path.is_none() {
            result.local_path = existing.map(str::to_string);
        }
        let Some((location, backend)) = result.preferred().filter(|_| stored) else {
            return Err(UploadError::AllBackendsFailed {
                file: attachment.original_name().to_string(),
                notices,
            });
        };

        let category =
            ContentCategory::classify(attachment.content_type(), attachment.original_name());
        let markup = Embed::new(location, category, backend)
            .with_label(&name)
            .render(&settings.viewers);

        info!(
            file = %name,
            backend = %backend,
            failures = notices.len(),
            "attachment uploaded"
        );
        Ok(UploadOutcome::Embedded {
            result,
            markup,
            notices,
        })
    }

    fn asset_source(&self, result: &UploadResult, existing: Option<&str>) -> Option<ItemSource> {
        if let Some(url) = &result.object_store_url {
            return Some(ItemSource::Url(url.clone()));
        }
        let path = result.local_path.as_deref().or(existing)?;
        self.local_tree
            .as_ref()
            .map(|vault| ItemSource::Path(vault.absolute_path(path)))
    }
}
