//! Depth-first, segment-by-segment folder resolution.

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, warn};

use super::types::{FolderNode, find_by_name};

/// Backend primitive that creates one folder.
pub trait FolderCreator: Send + Sync {
    /// Error returned by the backend.
    type Error: Display;

    /// Create `name` under `parent_id` (empty for the root) and return the new id.
    fn create_folder(
        &self,
        name: &str,
        parent_id: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

/// Resolves slash-delimited folder paths, creating missing folders on demand.
pub struct FolderResolver<C: FolderCreator> {
    creator: C,
}

impl<C: FolderCreator> FolderResolver<C> {
    /// Create a resolver over a creation primitive.
    #[must_use]
    pub fn new(creator: C) -> Self {
        Self { creator }
    }

    /// Resolve `path` from the root of the tree.
    ///
    /// Returns `None` for an empty path, for a missing path when
    /// `create_if_missing` is false, and when a creation call fails.
    pub async fn resolve(
        &self,
        roots: &[FolderNode],
        path: &str,
        create_if_missing: bool,
    ) -> Option<FolderNode> {
        self.resolve_from(roots, "", path, create_if_missing).await
    }

    /// Resolve `path` starting at `level`, whose nodes live under `parent_id`.
    pub async fn resolve_from(
        &self,
        level: &[FolderNode],
        parent_id: &str,
        path: &str,
        create_if_missing: bool,
    ) -> Option<FolderNode> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return None;
        }

        let mut level = level;
        let mut parent_id = parent_id.to_string();

        for (depth, segment) in segments.iter().enumerate() {
            match find_by_name(level, segment) {
                Some(node) if depth + 1 == segments.len() => return Some(node.clone()),
                Some(node) => {
                    parent_id.clone_from(&node.id);
                    level = &node.children;
                }
                None if create_if_missing => {
                    return self.create_chain(&segments[depth..], parent_id).await;
                }
                None => {
                    debug!(path, missing = %segment, "folder not found");
                    return None;
                }
            }
        }

        None
    }

    /// Create every segment in order, each under the previous one.
    async fn create_chain(&self, segments: &[&str], mut parent_id: String) -> Option<FolderNode> {
        let mut created = None;

        for segment in segments {
            match self.creator.create_folder(segment, &parent_id).await {
                Ok(id) => {
                    debug!(folder = %segment, id = %id, parent = %parent_id, "created folder");
                    let node = FolderNode::new(id.clone(), *segment, parent_id);
                    parent_id = id;
                    created = Some(node);
                }
                Err(err) => {
                    warn!(
                        folder = %segment,
                        parent = %parent_id,
                        error = %err,
                        "folder creation failed"
                    );
                    return None;
                }
            }
        }

        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records creation calls and hands out sequential ids.
    #[derive(Default)]
    struct RecordingCreator {
        calls: Mutex<Vec<(String, String)>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingCreator {
        fn failing_on(name: &'static str) -> Self {
            Self {
                fail_on: Some(name),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FolderCreator for &RecordingCreator {
        type Error = String;

        async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, String> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((name.to_string(), parent_id.to_string()));
            if self.fail_on == Some(name) {
                return Err(format!("cannot create {name}"));
            }
            Ok(format!("new-{}", calls.len()))
        }
    }

    /// A
    /// ├── B
    /// │   └── C
    /// └── D
    /// E
    fn snapshot() -> Vec<FolderNode> {
        vec![
            FolderNode::new("a", "A", "")
                .with_child(FolderNode::new("b", "B", "").with_child(FolderNode::new("c", "C", "")))
                .with_child(FolderNode::new("d", "D", "")),
            FolderNode::new("e", "E", ""),
        ]
    }

    #[tokio::test]
    async fn test_existing_deep_path_makes_no_calls() {
        let creator = RecordingCreator::default();
        let resolver = FolderResolver::new(&creator);

        let node = resolver.resolve(&snapshot(), "A/B/C", true).await;

        assert_eq!(node.map(|n| n.id), Some("c".to_string()));
        assert!(creator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_leaf_creates_once_under_deepest_ancestor() {
        let creator = RecordingCreator::default();
        let resolver = FolderResolver::new(&creator);

        let node = resolver
            .resolve(&snapshot(), "A/B/New", true)
            .await
            .expect("created");

        assert_eq!(creator.calls(), vec![("New".to_string(), "b".to_string())]);
        assert_eq!(node.parent_id, "b");
        assert_eq!(node.name, "New");
        assert!(node.children.is_empty());
    }

    #[tokio::test]
    async fn test_missing_without_create_returns_none() {
        let creator = RecordingCreator::default();
        let resolver = FolderResolver::new(&creator);

        assert!(resolver.resolve(&snapshot(), "A/X/Y", false).await.is_none());
        assert!(creator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_three_segments_with_only_first_existing() {
        let creator = RecordingCreator::default();
        let resolver = FolderResolver::new(&creator);

        let leaf = resolver
            .resolve(&snapshot(), "E/Trips/2024", true)
            .await
            .expect("created");

        let calls = creator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("Trips".to_string(), "e".to_string()));
        // the second folder hangs off the first created one
        assert_eq!(calls[1], ("2024".to_string(), "new-1".to_string()));
        assert_eq!(leaf.id, "new-2");
        assert_eq!(leaf.parent_id, "new-1");
    }

    #[tokio::test]
    async fn test_creation_failure_stops_the_chain() {
        let creator = RecordingCreator::failing_on("Trips");
        let resolver = FolderResolver::new(&creator);

        let node = resolver.resolve(&snapshot(), "E/Trips/2024", true).await;

        assert!(node.is_none());
        assert_eq!(creator.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_chain_is_not_rolled_back() {
        let creator = RecordingCreator::failing_on("2024");
        let resolver = FolderResolver::new(&creator);

        let node = resolver.resolve(&snapshot(), "E/Trips/2024", true).await;

        assert!(node.is_none());
        // "Trips" was created and stays created
        assert_eq!(creator.calls()[0].0, "Trips");
        assert_eq!(creator.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_path_is_not_found() {
        let creator = RecordingCreator::default();
        let resolver = FolderResolver::new(&creator);

        assert!(resolver.resolve(&snapshot(), "", true).await.is_none());
        assert!(resolver.resolve(&snapshot(), "///", true).await.is_none());
        assert!(creator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_segment_created_at_root() {
        let creator = RecordingCreator::default();
        let resolver = FolderResolver::new(&creator);

        let node = resolver.resolve(&[], "Inbox", true).await.expect("created");

        assert_eq!(creator.calls(), vec![("Inbox".to_string(), String::new())]);
        assert_eq!(node.parent_id, "");
    }

    #[tokio::test]
    async fn test_resolve_from_subtree() {
        let creator = RecordingCreator::default();
        let resolver = FolderResolver::new(&creator);
        let tree = snapshot();

        let node = resolver
            .resolve_from(&tree[0].children, "a", "Fresh", true)
            .await
            .expect("created");

        assert_eq!(node.parent_id, "a");
    }

    #[tokio::test]
    async fn test_match_is_case_sensitive() {
        let creator = RecordingCreator::default();
        let resolver = FolderResolver::new(&creator);

        let node = resolver.resolve(&snapshot(), "a", true).await.expect("created");

        assert_eq!(node.id, "new-1");
        assert_eq!(creator.calls().len(), 1);
    }
}
