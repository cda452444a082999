//! Folder CRUD plus the hierarchy operations behind one facade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use testhub_core::config::FolderConfig;
use testhub_core::types::double_option;
use testhub_database::{FolderRepository, TestCaseRepository};
use testhub_entity::folder::{CreateFolder, Folder, FolderPatch, FolderTree};

use crate::context::RequestContext;

use super::batch::{BatchMoveCoordinator, BatchMoveItem, BatchMoveResult};
use super::cascade::{DeleteOptions, FolderDeletionCascade};
use super::error::FolderError;
use super::guard::CycleGuard;
use super::locks::SiblingLocks;
use super::mover::{FolderMoveEngine, MoveFolderRequest};
use super::naming::ensure_not_blank;
use super::ordering::OrderIndexAllocator;
use super::tree::{TreeQuery, TreeService};

/// Manages folders of a project.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder repository.
    folder_repo: Arc<dyn FolderRepository>,
    /// Depth and cycle validation.
    guard: CycleGuard,
    /// Single moves.
    mover: Arc<FolderMoveEngine>,
    /// Batch moves.
    batch: BatchMoveCoordinator,
    /// Soft/hard delete and restore.
    cascade: FolderDeletionCascade,
    /// Tree and breadcrumb queries.
    tree: TreeService,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Owning project.
    pub project_id: Uuid,
    /// Parent folder ID (None for root-level).
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Folder name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Optional description.
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Request to update a folder's own attributes.
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    /// New name.
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New description; `null` clears it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option::deserialize"
    )]
    pub description: Option<Option<String>>,
    /// Lock or unlock the folder.
    #[serde(default)]
    pub is_locked: Option<bool>,
}

impl UpdateFolderRequest {
    /// A rename only.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A lock state change only.
    pub fn locked(is_locked: bool) -> Self {
        Self {
            is_locked: Some(is_locked),
            ..Self::default()
        }
    }
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folder_repo: Arc<dyn FolderRepository>,
        testcase_repo: Arc<dyn TestCaseRepository>,
        config: &FolderConfig,
    ) -> Self {
        let guard = CycleGuard::new(folder_repo.clone(), config.max_depth);
        let mover = Arc::new(FolderMoveEngine::new(
            folder_repo.clone(),
            guard.clone(),
            OrderIndexAllocator::from_config(config),
            SiblingLocks::new(),
        ));
        let batch = BatchMoveCoordinator::new(mover.clone(), config.max_batch_size);
        let cascade =
            FolderDeletionCascade::new(folder_repo.clone(), testcase_repo.clone(), guard.clone());
        let tree = TreeService::new(folder_repo.clone(), testcase_repo);

        Self {
            folder_repo,
            guard,
            mover,
            batch,
            cascade,
            tree,
        }
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, folder_id: Uuid) -> Result<Folder, FolderError> {
        self.folder_repo
            .get_by_id(folder_id)
            .await?
            .ok_or(FolderError::FolderNotFound(folder_id))
    }

    /// Creates a new folder as the last child of its parent.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> Result<Folder, FolderError> {
        req.validate()?;
        ensure_not_blank(&req.name)?;

        let parent = match req.parent_id {
            Some(parent_id) => {
                let parent = self
                    .folder_repo
                    .get_by_id(parent_id)
                    .await?
                    .filter(|p| p.project_id == req.project_id)
                    .ok_or(FolderError::FolderNotFound(parent_id))?;
                if parent.is_archived {
                    return Err(FolderError::Archived(parent_id));
                }
                Some(parent)
            }
            None => None,
        };
        let depth = self.guard.validate_depth(parent.as_ref())?;

        let _sibling_guard = self
            .mover
            .locks()
            .acquire(req.project_id, req.parent_id)
            .await;

        let siblings = self
            .folder_repo
            .list_by_parent(req.parent_id, req.project_id)
            .await?;
        if siblings.iter().any(|s| s.name == req.name) {
            warn!(
                user_id = %ctx.user_id,
                name = %req.name,
                "Create rejected: sibling name taken"
            );
            return Err(FolderError::NameConflict { name: req.name });
        }
        let order_index = self.mover.slot(&siblings, siblings.len(), None).await?;

        let folder = self
            .folder_repo
            .create(&CreateFolder {
                project_id: req.project_id,
                parent_id: req.parent_id,
                name: req.name,
                description: req.description,
                order_index,
                depth,
                created_by: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            parent_id = ?folder.parent_id,
            depth,
            order_index,
            "Folder created"
        );

        Ok(folder)
    }

    /// Renames, re-describes, locks or unlocks a folder.
    ///
    /// A locked folder only accepts requests that unlock it.
    pub async fn update_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        req: UpdateFolderRequest,
    ) -> Result<Folder, FolderError> {
        req.validate()?;

        let folder = self.get_folder(folder_id).await?;
        if folder.is_archived {
            return Err(FolderError::Archived(folder_id));
        }
        if folder.is_locked && req.is_locked != Some(false) {
            return Err(FolderError::Locked(folder_id));
        }

        let rename = req.name.filter(|name| *name != folder.name);
        if let Some(name) = &rename {
            ensure_not_blank(name)?;
        }

        let _sibling_guard = match &rename {
            Some(_) => Some(
                self.mover
                    .locks()
                    .acquire(folder.project_id, folder.parent_id)
                    .await,
            ),
            None => None,
        };

        if let Some(name) = &rename {
            let siblings = self
                .folder_repo
                .list_by_parent(folder.parent_id, folder.project_id)
                .await?;
            if siblings.iter().any(|s| s.id != folder.id && s.name == *name) {
                warn!(
                    user_id = %ctx.user_id,
                    folder_id = %folder_id,
                    name = %name,
                    "Rename rejected: sibling name taken"
                );
                return Err(FolderError::NameConflict { name: name.clone() });
            }
        }

        let patch = FolderPatch {
            name: rename,
            description: req.description,
            is_locked: req.is_locked,
            ..FolderPatch::default()
        };
        if patch.is_empty() {
            return Ok(folder);
        }

        let updated = self
            .folder_repo
            .update(folder_id, &patch)
            .await?
            .ok_or(FolderError::FolderNotFound(folder_id))?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            renamed = patch.name.is_some(),
            is_locked = updated.is_locked,
            "Folder updated"
        );

        Ok(updated)
    }

    /// Moves a folder. See [`FolderMoveEngine::move_folder`].
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        req: &MoveFolderRequest,
    ) -> Result<Folder, FolderError> {
        self.mover.move_folder(ctx, folder_id, req).await
    }

    /// Moves many folders. See [`BatchMoveCoordinator::move_batch`].
    pub async fn move_folder_batch(
        &self,
        ctx: &RequestContext,
        items: &[BatchMoveItem],
    ) -> Result<BatchMoveResult, FolderError> {
        self.batch.move_batch(ctx, items).await
    }

    /// Deletes a folder subtree. See [`FolderDeletionCascade::delete`].
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        options: DeleteOptions,
    ) -> Result<bool, FolderError> {
        self.cascade.delete(ctx, folder_id, options).await
    }

    /// Restores an archived folder subtree.
    pub async fn restore_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<Folder, FolderError> {
        self.cascade.restore(ctx, folder_id).await
    }

    /// Builds the folder tree of a project.
    pub async fn get_folder_tree(
        &self,
        project_id: Uuid,
        query: TreeQuery,
    ) -> Result<Vec<FolderTree>, FolderError> {
        self.tree.get_folder_tree(project_id, query).await
    }

    /// Root-first ancestor chain of a folder, ending with the folder itself.
    pub async fn get_breadcrumbs(&self, folder_id: Uuid) -> Result<Vec<Folder>, FolderError> {
        self.tree.get_breadcrumbs(folder_id).await
    }
}

#[cfg(test)]
mod tests {
    use testhub_database::MemoryStore;

    use super::*;

    fn service() -> (FolderService, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let service = FolderService::new(store.clone(), store, &FolderConfig::default());
        (service, Uuid::new_v4())
    }

    fn create(project_id: Uuid, parent_id: Option<Uuid>, name: &str) -> CreateFolderRequest {
        CreateFolderRequest {
            project_id,
            parent_id,
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_appends_at_tail() {
        let (svc, project) = service();
        let ctx = RequestContext::system();

        let a = svc.create_folder(&ctx, create(project, None, "A")).await.unwrap();
        let b = svc.create_folder(&ctx, create(project, None, "B")).await.unwrap();
        let c = svc
            .create_folder(&ctx, create(project, Some(a.id), "C"))
            .await
            .unwrap();

        assert_eq!(a.order_index, 100);
        assert_eq!(b.order_index, 200);
        assert_eq!(c.order_index, 100);
        assert_eq!(c.depth, 1);
        assert_eq!(c.created_by, ctx.user_id);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_and_duplicate_names() {
        let (svc, project) = service();
        let ctx = RequestContext::system();

        let err = svc.create_folder(&ctx, create(project, None, "  ")).await.unwrap_err();
        assert!(matches!(err, FolderError::InvalidName(_)));

        let err = svc.create_folder(&ctx, create(project, None, "")).await.unwrap_err();
        assert!(matches!(err, FolderError::InvalidName(_)));

        svc.create_folder(&ctx, create(project, None, "Smoke")).await.unwrap();
        let err = svc
            .create_folder(&ctx, create(project, None, "Smoke"))
            .await
            .unwrap_err();
        assert!(matches!(err, FolderError::NameConflict { .. }));
    }

    #[tokio::test]
    async fn test_create_under_missing_parent() {
        let (svc, project) = service();
        let missing = Uuid::new_v4();
        let err = svc
            .create_folder(&RequestContext::system(), create(project, Some(missing), "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, FolderError::FolderNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_locked_folder_only_accepts_unlock() {
        let (svc, project) = service();
        let ctx = RequestContext::system();
        let folder = svc.create_folder(&ctx, create(project, None, "Frozen")).await.unwrap();

        svc.update_folder(&ctx, folder.id, UpdateFolderRequest::locked(true))
            .await
            .unwrap();
        let err = svc
            .update_folder(&ctx, folder.id, UpdateFolderRequest::rename("Thawed"))
            .await
            .unwrap_err();
        assert!(matches!(err, FolderError::Locked(_)));

        let unlocked = svc
            .update_folder(
                &ctx,
                folder.id,
                UpdateFolderRequest {
                    name: Some("Thawed".to_string()),
                    is_locked: Some(false),
                    ..UpdateFolderRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unlocked.name, "Thawed");
        assert!(!unlocked.is_locked);
    }

    #[tokio::test]
    async fn test_update_clears_description() {
        let (svc, project) = service();
        let ctx = RequestContext::system();
        let folder = svc
            .create_folder(
                &ctx,
                CreateFolderRequest {
                    description: Some("nightly".to_string()),
                    ..create(project, None, "Nightly")
                },
            )
            .await
            .unwrap();

        let updated = svc
            .update_folder(
                &ctx,
                folder.id,
                UpdateFolderRequest {
                    description: Some(None),
                    ..UpdateFolderRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, None);
    }
}
