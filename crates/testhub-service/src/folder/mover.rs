//! Drag-and-drop reparenting and reordering.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use testhub_core::types::double_option;
use testhub_database::FolderRepository;
use testhub_entity::folder::{Folder, FolderPatch};

use crate::context::RequestContext;

use super::error::FolderError;
use super::guard::CycleGuard;
use super::locks::SiblingLocks;
use super::naming::ensure_not_blank;
use super::ordering::OrderIndexAllocator;

/// Where a dropped folder lands relative to `relative_to_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropType {
    /// Directly before the relative sibling.
    Before,
    /// Directly after the relative sibling.
    After,
    /// As the last child of the target parent.
    #[default]
    Into,
}

/// Request to move and/or reorder a folder.
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct MoveFolderRequest {
    /// New parent. Absent keeps the current parent (reorder in place);
    /// `null` moves to the root level.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option::deserialize"
    )]
    pub target_parent_id: Option<Option<Uuid>>,
    /// Placement relative to `relative_to_id`.
    #[serde(default)]
    pub drop_type: DropType,
    /// Sibling the drop is relative to.
    #[serde(default)]
    pub relative_to_id: Option<Uuid>,
    /// Explicit order index requested by the client.
    #[serde(default)]
    pub order_index: Option<i64>,
    /// Rename bundled with the move.
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
}

impl MoveFolderRequest {
    /// Move under `parent_id` (root when `None`) as its last child.
    pub fn into_parent(parent_id: Option<Uuid>) -> Self {
        Self {
            target_parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    /// Reorder directly before `sibling_id` within the current parent.
    pub fn before(sibling_id: Uuid) -> Self {
        Self {
            drop_type: DropType::Before,
            relative_to_id: Some(sibling_id),
            ..Self::default()
        }
    }

    /// Reorder directly after `sibling_id` within the current parent.
    pub fn after(sibling_id: Uuid) -> Self {
        Self {
            drop_type: DropType::After,
            relative_to_id: Some(sibling_id),
            ..Self::default()
        }
    }
}

/// Applies single folder moves.
#[derive(Debug, Clone)]
pub struct FolderMoveEngine {
    folder_repo: Arc<dyn FolderRepository>,
    guard: CycleGuard,
    allocator: OrderIndexAllocator,
    locks: SiblingLocks,
}

impl FolderMoveEngine {
    /// Creates a new move engine.
    pub fn new(
        folder_repo: Arc<dyn FolderRepository>,
        guard: CycleGuard,
        allocator: OrderIndexAllocator,
        locks: SiblingLocks,
    ) -> Self {
        Self {
            folder_repo,
            guard,
            allocator,
            locks,
        }
    }

    /// Sibling lock table shared with the other folder operations.
    pub fn locks(&self) -> &SiblingLocks {
        &self.locks
    }

    /// Moves a folder to a new parent and/or sibling position.
    ///
    /// Nothing is written until the folder, the target parent, the bundled
    /// rename and the structural checks have all passed. When the folder's
    /// depth changes, every descendant's depth is rewritten as well.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        req: &MoveFolderRequest,
    ) -> Result<Folder, FolderError> {
        req.validate()?;

        let folder = self
            .folder_repo
            .get_by_id(folder_id)
            .await?
            .ok_or(FolderError::FolderNotFound(folder_id))?;
        if folder.is_archived {
            return Err(FolderError::Archived(folder_id));
        }
        if folder.is_locked {
            return Err(FolderError::Locked(folder_id));
        }

        let target_parent_id = req.target_parent_id.unwrap_or(folder.parent_id);
        let validated = self.guard.validate_move(&folder, target_parent_id).await?;

        let name = match &req.name {
            Some(name) => {
                ensure_not_blank(name)?;
                name.clone()
            }
            None => folder.name.clone(),
        };

        let relative = match req.relative_to_id {
            Some(relative_id) => Some(
                self.folder_repo
                    .get_by_id(relative_id)
                    .await?
                    .filter(|r| r.project_id == folder.project_id)
                    .ok_or(FolderError::FolderNotFound(relative_id))?,
            ),
            None => None,
        };

        let _sibling_guard = self.locks.acquire(folder.project_id, target_parent_id).await;

        let siblings: Vec<Folder> = self
            .folder_repo
            .list_by_parent(target_parent_id, folder.project_id)
            .await?
            .into_iter()
            .filter(|s| s.id != folder.id)
            .collect();

        if siblings.iter().any(|s| s.name == name) {
            warn!(folder_id = %folder_id, name = %name, "Move rejected: sibling name taken");
            return Err(FolderError::NameConflict { name });
        }

        let same_parent = target_parent_id == folder.parent_id;
        let order_index = if same_parent && relative.as_ref().is_some_and(|r| r.id == folder.id) {
            folder.order_index
        } else {
            let position = insert_position(&siblings, req, relative.as_ref());
            self.slot(&siblings, position, req.order_index).await?
        };

        let patch = FolderPatch {
            parent_id: (!same_parent).then_some(target_parent_id),
            name: (name != folder.name).then_some(name),
            order_index: (order_index != folder.order_index).then_some(order_index),
            depth: (validated.new_depth != folder.depth).then_some(validated.new_depth),
            ..FolderPatch::default()
        };

        let moved = self
            .folder_repo
            .update(folder_id, &patch)
            .await?
            .ok_or(FolderError::FolderNotFound(folder_id))?;

        if validated.new_depth != folder.depth {
            for entry in &validated.descendants {
                let depth = validated.new_depth + entry.relative_depth;
                if entry.folder.depth != depth {
                    self.folder_repo
                        .update(entry.folder.id, &FolderPatch::depth(depth))
                        .await?;
                }
            }
        }

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            from_parent = ?folder.parent_id,
            to_parent = ?target_parent_id,
            order_index,
            depth = moved.depth,
            descendants = validated.descendants.len(),
            "Folder moved"
        );

        Ok(moved)
    }

    /// Computes the order index for a folder inserted at `position` among
    /// `siblings`, renumbering the set when the neighbours leave no room.
    ///
    /// The caller must hold the sibling set's lock.
    pub(crate) async fn slot(
        &self,
        siblings: &[Folder],
        position: usize,
        requested: Option<i64>,
    ) -> Result<i64, FolderError> {
        let prev = position
            .checked_sub(1)
            .and_then(|i| siblings.get(i))
            .map(|s| s.order_index);
        let next = siblings.get(position).map(|s| s.order_index);

        if let Some(requested) = requested {
            let free = !siblings.iter().any(|s| s.order_index == requested);
            if free
                && self.allocator.is_usable(requested)
                && prev.is_none_or(|p| p < requested)
                && next.is_none_or(|n| requested < n)
            {
                return Ok(requested);
            }
        }

        if self.allocator.has_room(prev, next) {
            return Ok(self.allocator.allocate(prev, next));
        }

        let spread = self.allocator.spread(siblings.len() + 1);
        debug!(
            siblings = siblings.len(),
            position, "Order gap exhausted, renumbering sibling set"
        );
        for (i, sibling) in siblings.iter().enumerate() {
            let slot = if i < position { spread[i] } else { spread[i + 1] };
            if sibling.order_index != slot {
                self.folder_repo
                    .update(sibling.id, &FolderPatch::order_index(slot))
                    .await?;
            }
        }
        Ok(spread[position])
    }
}

/// Index in `siblings` at which the moving folder is inserted.
///
/// An explicit order index wins; a taken index places the folder in front
/// of the sibling holding it. A relative folder that is not one of the
/// target siblings falls back to the tail.
fn insert_position(
    siblings: &[Folder],
    req: &MoveFolderRequest,
    relative: Option<&Folder>,
) -> usize {
    if let Some(requested) = req.order_index {
        return siblings
            .iter()
            .position(|s| s.order_index >= requested)
            .unwrap_or(siblings.len());
    }

    let anchor = relative.and_then(|r| siblings.iter().position(|s| s.id == r.id));
    match (req.drop_type, anchor) {
        (DropType::Before, Some(i)) => i,
        (DropType::After, Some(i)) => i + 1,
        _ => siblings.len(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sibling(order_index: i64) -> Folder {
        let now = Utc::now();
        Folder {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            parent_id: None,
            name: format!("f{order_index}"),
            description: None,
            order_index,
            depth: 0,
            created_by: Uuid::nil(),
            is_locked: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_insert_position_by_drop_type() {
        let siblings = vec![sibling(100), sibling(200), sibling(300)];
        let anchor = siblings[1].clone();

        let before = MoveFolderRequest::before(anchor.id);
        assert_eq!(insert_position(&siblings, &before, Some(&anchor)), 1);

        let after = MoveFolderRequest::after(anchor.id);
        assert_eq!(insert_position(&siblings, &after, Some(&anchor)), 2);

        let into = MoveFolderRequest::default();
        assert_eq!(insert_position(&siblings, &into, None), 3);
    }

    #[test]
    fn test_unresolved_relative_goes_to_tail() {
        let siblings = vec![sibling(100), sibling(200)];
        let stranger = sibling(150);
        let req = MoveFolderRequest::before(stranger.id);
        assert_eq!(insert_position(&siblings, &req, Some(&stranger)), 2);
    }

    #[test]
    fn test_explicit_index_position() {
        let siblings = vec![sibling(100), sibling(200)];
        let req = MoveFolderRequest {
            order_index: Some(200),
            ..MoveFolderRequest::default()
        };
        assert_eq!(insert_position(&siblings, &req, None), 1);

        let req = MoveFolderRequest {
            order_index: Some(999),
            ..MoveFolderRequest::default()
        };
        assert_eq!(insert_position(&siblings, &req, None), 2);
    }

    #[test]
    fn test_request_json() {
        let req: MoveFolderRequest = serde_json::from_str(
            r#"{"target_parent_id": null, "drop_type": "after", "relative_to_id": "00000000-0000-0000-0000-000000000001"}"#,
        )
        .unwrap();
        assert_eq!(req.target_parent_id, Some(None));
        assert_eq!(req.drop_type, DropType::After);

        let req: MoveFolderRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.target_parent_id, None);
        assert_eq!(req.drop_type, DropType::Into);
    }
}
