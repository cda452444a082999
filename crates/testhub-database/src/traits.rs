//! Repository traits consumed by the folder engine.
//!
//! All storage specifics live behind these traits; services hold them as
//! `Arc<dyn ...>` and never reach past them.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use testhub_core::result::AppResult;
use testhub_entity::folder::{CreateFolder, Folder, FolderPatch};

/// Storage for folder rows.
#[async_trait]
pub trait FolderRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new folder row and return it.
    ///
    /// Fails with `AlreadyExists` when a sibling already uses the name and
    /// with `NotFound` when the parent row is missing.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Find a folder by ID, archived or not.
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// List the direct children of `parent_id` (roots when `None`) within a
    /// project, ordered by `order_index` then `id`. Archived rows included.
    async fn list_by_parent(
        &self,
        parent_id: Option<Uuid>,
        project_id: Uuid,
    ) -> AppResult<Vec<Folder>>;

    /// Apply a partial update. Returns `None` when the row does not exist.
    ///
    /// Name and parent failures are reported as for [`create`](Self::create).
    async fn update(&self, id: Uuid, patch: &FolderPatch) -> AppResult<Option<Folder>>;

    /// Remove a folder row. Returns `true` if a row was removed.
    ///
    /// Rows that still have child folders or filed test cases are refused.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// The slice of test case storage the folder engine needs.
#[async_trait]
pub trait TestCaseRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Null the folder reference of every test case in `folder_id`.
    /// Returns the number of detached test cases.
    async fn detach_folder(&self, folder_id: Uuid) -> AppResult<u64>;

    /// Count test cases per folder. Folders without test cases may be absent.
    async fn count_by_folders(&self, folder_ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>>;
}
