//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use testhub_core::types::double_option;

/// A folder in a project's test-case hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// The project this folder belongs to.
    pub project_id: Uuid,
    /// Parent folder ID (null for root folders).
    pub parent_id: Option<Uuid>,
    /// Folder name, unique among its siblings.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Sparse sibling position. Sorting siblings by this value gives the
    /// display order.
    pub order_index: i64,
    /// Depth in the folder tree (0 for root).
    pub depth: i32,
    /// The user who created the folder.
    pub created_by: Uuid,
    /// Whether the folder is locked against mutation.
    pub is_locked: bool,
    /// Whether the folder has been soft-deleted.
    pub is_archived: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Lifecycle status derived from the archive flag.
    pub fn status(&self) -> FolderStatus {
        if self.is_archived {
            FolderStatus::Archived
        } else {
            FolderStatus::Active
        }
    }
}

/// Lifecycle state of a folder row that still exists.
///
/// Hard-deleted folders have no row and therefore no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderStatus {
    /// Visible and mutable (unless locked).
    Active,
    /// Soft-deleted; can be restored.
    Archived,
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The owning project.
    pub project_id: Uuid,
    /// Parent folder (None for root).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Sibling position.
    pub order_index: i64,
    /// Depth in the tree.
    pub depth: i32,
    /// The creating user.
    pub created_by: Uuid,
}

/// A partial update to a folder row.
///
/// `None` leaves a column untouched. For the nullable columns the inner
/// option distinguishes "set to null" from "set to a value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderPatch {
    /// New parent (`Some(None)` moves to the root level).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option::deserialize"
    )]
    pub parent_id: Option<Option<Uuid>>,
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description (`Some(None)` clears it).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option::deserialize"
    )]
    pub description: Option<Option<String>>,
    /// New sibling position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
    /// New depth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i32>,
    /// New lock flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    /// New archive flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl FolderPatch {
    /// Patch that only sets the archive flag.
    pub fn archived(is_archived: bool) -> Self {
        Self {
            is_archived: Some(is_archived),
            ..Self::default()
        }
    }

    /// Patch that only sets the depth.
    pub fn depth(depth: i32) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }

    /// Patch that only sets the order index.
    pub fn order_index(order_index: i64) -> Self {
        Self {
            order_index: Some(order_index),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.parent_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.order_index.is_none()
            && self.depth.is_none()
            && self.is_locked.is_none()
            && self.is_archived.is_none()
    }

    /// Apply the patch to a folder and bump `updated_at`.
    pub fn apply(&self, folder: &mut Folder) {
        if let Some(parent_id) = self.parent_id {
            folder.parent_id = parent_id;
        }
        if let Some(name) = &self.name {
            folder.name = name.clone();
        }
        if let Some(description) = &self.description {
            folder.description = description.clone();
        }
        if let Some(order_index) = self.order_index {
            folder.order_index = order_index;
        }
        if let Some(depth) = self.depth {
            folder.depth = depth;
        }
        if let Some(is_locked) = self.is_locked {
            folder.is_locked = is_locked;
        }
        if let Some(is_archived) = self.is_archived {
            folder.is_archived = is_archived;
        }
        folder.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Folder {
        let now = Utc::now();
        Folder {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            parent_id: Some(Uuid::new_v4()),
            name: "Regression".to_string(),
            description: Some("nightly".to_string()),
            order_index: 100,
            depth: 1,
            created_by: Uuid::nil(),
            is_locked: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_moves_to_root_and_clears_description() {
        let mut folder = sample();
        let patch = FolderPatch {
            parent_id: Some(None),
            description: Some(None),
            depth: Some(0),
            ..FolderPatch::default()
        };

        patch.apply(&mut folder);

        assert!(folder.is_root());
        assert_eq!(folder.description, None);
        assert_eq!(folder.depth, 0);
        assert_eq!(folder.name, "Regression");
    }

    #[test]
    fn test_empty_patch_keeps_columns() {
        let mut folder = sample();
        let before = folder.clone();
        let patch = FolderPatch::default();
        assert!(patch.is_empty());

        patch.apply(&mut folder);

        assert_eq!(folder.parent_id, before.parent_id);
        assert_eq!(folder.order_index, before.order_index);
    }

    #[test]
    fn test_status_follows_archive_flag() {
        let mut folder = sample();
        assert_eq!(folder.status(), FolderStatus::Active);
        FolderPatch::archived(true).apply(&mut folder);
        assert_eq!(folder.status(), FolderStatus::Archived);
    }
}
