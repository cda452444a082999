//! Structural validation of folder moves.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use uuid::Uuid;

use testhub_database::FolderRepository;
use testhub_entity::folder::Folder;

use super::error::FolderError;

/// A descendant found while walking a subtree.
#[derive(Debug, Clone)]
pub struct SubtreeEntry {
    /// The descendant row.
    pub folder: Folder,
    /// Distance from the subtree root (children are 1).
    pub relative_depth: i32,
}

/// Outcome of a successful move validation.
#[derive(Debug, Clone)]
pub struct ValidatedMove {
    /// The resolved target parent (None for root level).
    pub parent: Option<Folder>,
    /// Depth the moved folder will have.
    pub new_depth: i32,
    /// The moving folder's descendants in breadth-first order.
    pub descendants: Vec<SubtreeEntry>,
}

/// Rejects moves that would break the forest shape or the depth bound.
///
/// Only reads from the repository.
#[derive(Debug, Clone)]
pub struct CycleGuard {
    folder_repo: Arc<dyn FolderRepository>,
    max_depth: i32,
}

impl CycleGuard {
    /// Creates a new guard.
    pub fn new(folder_repo: Arc<dyn FolderRepository>, max_depth: i32) -> Self {
        Self {
            folder_repo,
            max_depth,
        }
    }

    /// Configured maximum depth.
    pub fn max_depth(&self) -> i32 {
        self.max_depth
    }

    /// Validates placing `folder` under `proposed_parent_id` (root when `None`).
    ///
    /// The depth check covers the whole subtree: the deepest descendant must
    /// still fit once the folder has moved.
    pub async fn validate_move(
        &self,
        folder: &Folder,
        proposed_parent_id: Option<Uuid>,
    ) -> Result<ValidatedMove, FolderError> {
        if proposed_parent_id == Some(folder.id) {
            return Err(FolderError::SelfParent(folder.id));
        }

        let parent = match proposed_parent_id {
            Some(parent_id) => Some(self.resolve_parent(folder.project_id, parent_id).await?),
            None => None,
        };

        let descendants = self.descendants(folder).await?;

        if let Some(parent) = &parent {
            if descendants.iter().any(|d| d.folder.id == parent.id) {
                return Err(FolderError::DescendantCycle {
                    folder_id: folder.id,
                    target_id: parent.id,
                });
            }
            if parent.is_archived {
                return Err(FolderError::Archived(parent.id));
            }
        }

        let new_depth = parent.as_ref().map_or(0, |p| p.depth + 1);
        let height = descendants
            .iter()
            .map(|d| d.relative_depth)
            .max()
            .unwrap_or(0);
        if new_depth + height > self.max_depth {
            return Err(FolderError::DepthExceeded {
                depth: new_depth + height,
                max: self.max_depth,
            });
        }

        Ok(ValidatedMove {
            parent,
            new_depth,
            descendants,
        })
    }

    /// Depth of a new child of `parent`, rejected past the maximum.
    pub fn validate_depth(&self, parent: Option<&Folder>) -> Result<i32, FolderError> {
        let depth = parent.map_or(0, |p| p.depth + 1);
        if depth > self.max_depth {
            return Err(FolderError::DepthExceeded {
                depth,
                max: self.max_depth,
            });
        }
        Ok(depth)
    }

    /// Walks the subtree below `root` breadth-first.
    ///
    /// A folder already seen is never expanded twice, so damaged data with a
    /// parent loop cannot make the walk run forever.
    pub async fn descendants(&self, root: &Folder) -> Result<Vec<SubtreeEntry>, FolderError> {
        let mut seen = HashSet::from([root.id]);
        let mut queue = VecDeque::from([(root.id, 0)]);
        let mut found = Vec::new();

        while let Some((id, depth)) = queue.pop_front() {
            let children = self
                .folder_repo
                .list_by_parent(Some(id), root.project_id)
                .await?;
            for child in children {
                if !seen.insert(child.id) {
                    continue;
                }
                queue.push_back((child.id, depth + 1));
                found.push(SubtreeEntry {
                    folder: child,
                    relative_depth: depth + 1,
                });
            }
        }

        Ok(found)
    }

    /// Loads a prospective parent, which must belong to the same project.
    async fn resolve_parent(&self, project_id: Uuid, parent_id: Uuid) -> Result<Folder, FolderError> {
        self.folder_repo
            .get_by_id(parent_id)
            .await?
            .filter(|p| p.project_id == project_id)
            .ok_or(FolderError::FolderNotFound(parent_id))
    }
}
