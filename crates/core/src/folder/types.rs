//! Folder tree types.

use serde::{Deserialize, Serialize};

/// One directory in the asset manager's folder hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Backend identifier.
    pub id: String,
    /// Folder name, unique among siblings.
    pub name: String,
    /// Parent identifier; empty for top-level folders.
    pub parent_id: String,
    /// Child folders, in backend order.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Create a node with no children.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: parent_id.into(),
            children: Vec::new(),
        }
    }

    /// Add a child, setting its parent id to this node's id.
    #[must_use]
    pub fn with_child(mut self, mut child: FolderNode) -> Self {
        child.parent_id.clone_from(&self.id);
        self.children.push(child);
        self
    }

    /// Find a direct child by exact, case-sensitive name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&FolderNode> {
        find_by_name(&self.children, name)
    }
}

/// Linear search of one level of the tree.
pub(crate) fn find_by_name<'a>(nodes: &'a [FolderNode], name: &str) -> Option<&'a FolderNode> {
    nodes.iter().find(|node| node.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_child_sets_parent() {
        let root = FolderNode::new("a", "A", "").with_child(FolderNode::new("b", "B", "wrong"));
        let child = root.child("B").expect("child B");
        assert_eq!(child.parent_id, "a");
    }

    #[test]
    fn test_child_lookup_is_case_sensitive() {
        let root = FolderNode::new("a", "A", "").with_child(FolderNode::new("b", "Photos", ""));
        assert!(root.child("Photos").is_some());
        assert!(root.child("photos").is_none());
    }
}
