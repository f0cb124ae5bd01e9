//! Asset-manager JSON API client.
//!
//! Every endpoint answers HTTP 200 with `{"status": "success", "data": ...}`.
//! Any other status code or envelope status is a failure.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use notedrop_core::eagle::{EagleApi, EagleError, ItemSource, NewItem};
use notedrop_core::folder::FolderNode;
use notedrop_shared::EagleConfig;

/// Client for the asset manager's local API.
#[derive(Debug, Clone)]
pub struct EagleClient {
    client: Client,
    base_url: String,
}

impl EagleClient {
    /// Build a client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &EagleConfig) -> Result<Self, EagleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EagleError::transport(e.to_string()))?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Use an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn call<T: DeserializeOwned + Send>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, EagleError> {
        let response = request
            .send()
            .await
            .map_err(|e| EagleError::transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(EagleError::Status {
                status: status.as_u16(),
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| EagleError::decode(e.to_string()))?;
        if envelope.status != "success" {
            return Err(EagleError::Rejected(
                envelope.message.unwrap_or(envelope.status),
            ));
        }
        Ok(envelope.data)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Folder as the API returns it: nested, without parent ids.
#[derive(Deserialize)]
struct WireFolder {
    id: String,
    name: String,
    #[serde(default)]
    children: Vec<WireFolder>,
}

impl WireFolder {
    fn into_node(self, parent_id: &str) -> FolderNode {
        let mut node = FolderNode::new(self.id, self.name, parent_id);
        node.children = self
            .children
            .into_iter()
            .map(|child| child.into_node(&node.id))
            .collect();
        node
    }
}

#[derive(Deserialize)]
struct WireItem {
    id: String,
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolder<'a> {
    folder_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    parent: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddFromUrl<'a> {
    url: &'a str,
    name: &'a str,
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<&'a str>,
    website: &'a str,
    annotation: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddFromPath<'a> {
    path: String,
    name: &'a str,
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<&'a str>,
    annotation: &'a str,
}

/// The add endpoints report the new id as a bare string, as `{"id": ...}`,
/// or not at all.
fn item_id(data: Option<Value>) -> Option<String> {
    match data? {
        Value::String(id) if !id.is_empty() => Some(id),
        Value::Object(map) => map
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

impl EagleApi for EagleClient {
    async fn list_folders(&self) -> Result<Vec<FolderNode>, EagleError> {
        let folders: Vec<WireFolder> = self
            .call(self.client.get(self.url("/api/folder/list")))
            .await?
            .unwrap_or_default();
        Ok(folders
            .into_iter()
            .map(|folder| folder.into_node(""))
            .collect())
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, EagleError> {
        let body = CreateFolder {
            folder_name: name,
            parent: parent_id,
        };
        let created: Option<WireItem> = self
            .call(self.client.post(self.url("/api/folder/create")).json(&body))
            .await?;
        created
            .map(|folder| folder.id)
            .ok_or_else(|| EagleError::decode("folder created without an id"))
    }

    async fn add_item(&self, item: &NewItem) -> Result<Option<String>, EagleError> {
        let folder_id = item.folder_id.as_deref();
        let request = match &item.source {
            ItemSource::Url(url) => self.client.post(self.url("/api/item/addFromURL")).json(
                &AddFromUrl {
                    url,
                    name: &item.name,
                    tags: &item.tags,
                    folder_id,
                    website: url,
                    annotation: &item.annotation,
                },
            ),
            ItemSource::Path(path) => self.client.post(self.url("/api/item/addFromPath")).json(
                &AddFromPath {
                    path: path.to_string_lossy().into_owned(),
                    name: &item.name,
                    tags: &item.tags,
                    folder_id,
                    annotation: &item.annotation,
                },
            ),
        };

        let data: Option<Value> = self.call(request).await?;
        Ok(item_id(data))
    }

    async fn find_item(
        &self,
        name: &str,
        folder_id: Option<&str>,
    ) -> Result<Option<String>, EagleError> {
        let mut query = vec![("keyword", name)];
        if let Some(folder) = folder_id {
            query.push(("folders", folder));
        }
        let items: Vec<WireItem> = self
            .call(self.client.get(self.url("/api/item/list")).query(&query))
            .await?
            .unwrap_or_default();
        debug!(name, hits = items.len(), "item lookup");

        Ok(items
            .into_iter()
            .find(|item| item.name == name)
            .map(|item| item.id))
    }
}
