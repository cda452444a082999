//! Shared test helpers for folder engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use testhub_core::config::FolderConfig;
use testhub_core::error::AppError;
use testhub_core::result::AppResult;
use testhub_database::{FolderRepository, MemoryStore};
use testhub_entity::folder::{CreateFolder, Folder, FolderPatch};
use testhub_entity::testcase::TestCase;
use testhub_service::RequestContext;
use testhub_service::folder::{CreateFolderRequest, FolderService};

/// Test application context
pub struct TestHub {
    /// The backing in-memory store for direct inspection
    pub store: Arc<MemoryStore>,
    /// Service under test
    pub service: FolderService,
    /// Project every helper creates folders in
    pub project_id: Uuid,
    /// Acting user
    pub ctx: RequestContext,
}

impl TestHub {
    /// Create a hub with default folder settings
    pub fn new() -> Self {
        Self::with_config(FolderConfig::default())
    }

    /// Create a hub with custom folder settings
    pub fn with_config(config: FolderConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let service = FolderService::new(store.clone(), store.clone(), &config);
        Self {
            store,
            service,
            project_id: Uuid::new_v4(),
            ctx: RequestContext::new(Uuid::new_v4(), "tester"),
        }
    }

    /// A service over the same store whose `write`-th folder write fails
    pub fn service_failing_on(&self, write: usize) -> FolderService {
        let folders = Arc::new(FailingFolders::new(self.store.clone(), write));
        FolderService::new(folders, self.store.clone(), &FolderConfig::default())
    }

    /// Create a folder under `parent` (root when `None`)
    pub async fn folder(&self, parent: Option<&Folder>, name: &str) -> Folder {
        self.service
            .create_folder(
                &self.ctx,
                CreateFolderRequest {
                    project_id: self.project_id,
                    parent_id: parent.map(|p| p.id),
                    name: name.to_string(),
                    description: None,
                },
            )
            .await
            .expect("Failed to create folder")
    }

    /// Create a straight chain of `len` folders starting at the root
    pub async fn chain(&self, prefix: &str, len: usize) -> Vec<Folder> {
        let mut out: Vec<Folder> = Vec::with_capacity(len);
        for i in 0..len {
            let folder = self.folder(out.last(), &format!("{prefix}-{i}")).await;
            out.push(folder);
        }
        out
    }

    /// File a test case into `folder`
    pub async fn testcase(&self, folder: &Folder, title: &str) -> TestCase {
        self.store
            .insert_testcase(self.project_id, Some(folder.id), title)
            .await
    }

    /// Reload a folder straight from the store
    pub async fn reload(&self, id: Uuid) -> Option<Folder> {
        self.store.get_by_id(id).await.expect("Failed to read folder")
    }

    /// Ordered children of `parent`
    pub async fn children(&self, parent: Option<&Folder>) -> Vec<Folder> {
        self.store
            .list_by_parent(parent.map(|p| p.id), self.project_id)
            .await
            .expect("Failed to list folders")
    }

    /// Names of the ordered children of `parent`
    pub async fn child_names(&self, parent: Option<&Folder>) -> Vec<String> {
        self.children(parent)
            .await
            .into_iter()
            .map(|f| f.name)
            .collect()
    }
}

/// Folder storage that fails the n-th `update` or `delete` (1-based).
///
/// Reads and every other write go straight to the wrapped store.
#[derive(Debug)]
pub struct FailingFolders {
    inner: Arc<MemoryStore>,
    fail_on: usize,
    writes: AtomicUsize,
}

impl FailingFolders {
    pub fn new(inner: Arc<MemoryStore>, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            writes: AtomicUsize::new(0),
        }
    }

    fn tick(&self) -> AppResult<()> {
        let write = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if write == self.fail_on {
            return Err(AppError::database("connection reset during write"));
        }
        Ok(())
    }
}

#[async_trait]
impl FolderRepository for FailingFolders {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        self.inner.create(data).await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        self.inner.get_by_id(id).await
    }

    async fn list_by_parent(
        &self,
        parent_id: Option<Uuid>,
        project_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        self.inner.list_by_parent(parent_id, project_id).await
    }

    async fn update(&self, id: Uuid, patch: &FolderPatch) -> AppResult<Option<Folder>> {
        self.tick()?;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.tick()?;
        self.inner.delete(id).await
    }
}
