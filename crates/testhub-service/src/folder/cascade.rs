//! Subtree deletion and restoration.

use std::iter;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use testhub_database::{FolderRepository, TestCaseRepository};
use testhub_entity::folder::{Folder, FolderPatch};

use crate::context::RequestContext;

use super::error::FolderError;
use super::guard::CycleGuard;

/// How a folder is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Archive the subtree; rows are kept and can be restored.
    #[default]
    Soft,
    /// Remove the subtree's rows and detach their test cases.
    Hard,
}

/// Options of a delete request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeleteOptions {
    /// Soft or hard delete.
    #[serde(default)]
    pub mode: DeleteMode,
    /// Delete even if folders in the subtree are locked.
    #[serde(default)]
    pub force: bool,
}

impl DeleteOptions {
    /// Soft delete without force.
    pub fn soft() -> Self {
        Self {
            mode: DeleteMode::Soft,
            force: false,
        }
    }

    /// Hard delete without force.
    pub fn hard() -> Self {
        Self {
            mode: DeleteMode::Hard,
            force: false,
        }
    }

    /// The same options with `force` set.
    pub fn forced(self) -> Self {
        Self {
            force: true,
            ..self
        }
    }
}

/// Archives, removes and restores folder subtrees.
#[derive(Debug, Clone)]
pub struct FolderDeletionCascade {
    folder_repo: Arc<dyn FolderRepository>,
    testcase_repo: Arc<dyn TestCaseRepository>,
    guard: CycleGuard,
}

impl FolderDeletionCascade {
    /// Creates a new cascade.
    pub fn new(
        folder_repo: Arc<dyn FolderRepository>,
        testcase_repo: Arc<dyn TestCaseRepository>,
        guard: CycleGuard,
    ) -> Self {
        Self {
            folder_repo,
            testcase_repo,
            guard,
        }
    }

    /// Deletes a folder and its whole subtree.
    ///
    /// Returns `Ok(false)` when the folder does not exist. Locks are checked
    /// for the entire subtree before anything is written. Children are
    /// always processed before their parent. If storage fails after part of
    /// the subtree has been processed the result is
    /// [`FolderError::CascadeIncomplete`].
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        options: DeleteOptions,
    ) -> Result<bool, FolderError> {
        let Some(folder) = self.folder_repo.get_by_id(folder_id).await? else {
            return Ok(false);
        };

        let descendants = self.guard.descendants(&folder).await?;

        if !options.force {
            let locked = iter::once(&folder)
                .chain(descendants.iter().map(|d| &d.folder))
                .find(|f| f.is_locked);
            if let Some(locked) = locked {
                warn!(
                    user_id = %ctx.user_id,
                    folder_id = %folder_id,
                    locked_id = %locked.id,
                    "Delete rejected: subtree contains a locked folder"
                );
                return Err(FolderError::Locked(locked.id));
            }
        }

        // Breadth-first order reversed puts every child ahead of its parent.
        let order = descendants
            .iter()
            .rev()
            .map(|d| &d.folder)
            .chain(iter::once(&folder));

        let mut processed = 0;
        let mut detached = 0;
        for target in order {
            let step = match options.mode {
                DeleteMode::Soft => self.archive(target).await.map(|_| 0),
                DeleteMode::Hard => self.remove(target).await,
            };
            match step {
                Ok(count) => {
                    detached += count;
                    processed += 1;
                }
                Err(e) if processed == 0 => return Err(e),
                Err(e) => {
                    error!(
                        user_id = %ctx.user_id,
                        folder_id = %folder_id,
                        failed_at = %target.id,
                        processed,
                        error = %e,
                        "Folder cascade stopped part-way"
                    );
                    return Err(FolderError::CascadeIncomplete {
                        folder_id,
                        processed,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            mode = ?options.mode,
            folders = processed,
            detached_testcases = detached,
            "Folder deleted"
        );

        Ok(true)
    }

    /// Brings an archived folder and its archived descendants back.
    ///
    /// A folder whose parent is still archived cannot be restored.
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<Folder, FolderError> {
        let folder = self
            .folder_repo
            .get_by_id(folder_id)
            .await?
            .ok_or(FolderError::FolderNotFound(folder_id))?;
        if folder.is_locked {
            return Err(FolderError::Locked(folder_id));
        }
        if !folder.is_archived {
            return Ok(folder);
        }

        if let Some(parent_id) = folder.parent_id {
            let parent = self.folder_repo.get_by_id(parent_id).await?;
            if parent.is_some_and(|p| p.is_archived) {
                return Err(FolderError::Archived(parent_id));
            }
        }

        let restored = self
            .folder_repo
            .update(folder_id, &FolderPatch::archived(false))
            .await?
            .ok_or(FolderError::FolderNotFound(folder_id))?;

        let mut count = 1;
        for entry in self.guard.descendants(&folder).await? {
            if entry.folder.is_archived {
                self.folder_repo
                    .update(entry.folder.id, &FolderPatch::archived(false))
                    .await?;
                count += 1;
            }
        }

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            folders = count,
            "Folder restored"
        );

        Ok(restored)
    }

    async fn archive(&self, folder: &Folder) -> Result<(), FolderError> {
        if folder.is_archived {
            return Ok(());
        }
        self.folder_repo
            .update(folder.id, &FolderPatch::archived(true))
            .await?
            .ok_or(FolderError::FolderNotFound(folder.id))?;
        Ok(())
    }

    async fn remove(&self, folder: &Folder) -> Result<u64, FolderError> {
        let detached = self.testcase_repo.detach_folder(folder.id).await?;
        if !self.folder_repo.delete(folder.id).await? {
            return Err(FolderError::FolderNotFound(folder.id));
        }
        Ok(detached)
    }
}
