//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Folder;

/// A node in a project's folder tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTree {
    /// Folder ID.
    pub id: Uuid,
    /// Parent folder ID.
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Folder description.
    pub description: Option<String>,
    /// Sibling position.
    pub order_index: i64,
    /// Depth level.
    pub depth: i32,
    /// Whether the folder is locked.
    pub is_locked: bool,
    /// Whether the folder is archived.
    pub is_archived: bool,
    /// Number of test cases filed directly in this folder.
    pub testcase_count: u64,
    /// Number of child nodes included below.
    pub child_count: u64,
    /// Child folder nodes, in display order.
    pub children: Vec<FolderTree>,
}

impl FolderTree {
    /// Build a node from a folder row and its already-built children.
    pub fn from_folder(folder: &Folder, testcase_count: u64, children: Vec<FolderTree>) -> Self {
        Self {
            id: folder.id,
            parent_id: folder.parent_id,
            name: folder.name.clone(),
            description: folder.description.clone(),
            order_index: folder.order_index,
            depth: folder.depth,
            is_locked: folder.is_locked,
            is_archived: folder.is_archived,
            testcase_count,
            child_count: children.len() as u64,
            children,
        }
    }

    /// Total number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> u64 {
        1 + self.children.iter().map(FolderTree::node_count).sum::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn folder(name: &str, parent_id: Option<Uuid>, depth: i32) -> Folder {
        let now = Utc::now();
        Folder {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            parent_id,
            name: name.to_string(),
            description: None,
            order_index: 100,
            depth,
            created_by: Uuid::nil(),
            is_locked: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_node_count_and_json_shape() {
        let root = folder("Smoke", None, 0);
        let child = folder("Login", Some(root.id), 1);
        let leaf = FolderTree::from_folder(&child, 3, Vec::new());
        let tree = FolderTree::from_folder(&root, 0, vec![leaf]);

        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.child_count, 1);

        let json = serde_json::to_value(&tree).expect("serialize");
        assert_eq!(json["children"][0]["name"], "Login");
        assert_eq!(json["children"][0]["testcase_count"], 3);
    }
}
