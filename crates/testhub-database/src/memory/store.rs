//! In-memory repository backed by a folder arena and a sibling index.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use testhub_core::error::AppError;
use testhub_core::result::AppResult;
use testhub_entity::folder::{CreateFolder, Folder, FolderPatch};
use testhub_entity::testcase::TestCase;

use crate::traits::{FolderRepository, TestCaseRepository};

/// `(project_id, parent_id)` identifying one sibling set.
type SiblingKey = (Uuid, Option<Uuid>);

/// Folder and test case storage held in process memory.
///
/// Cloning shares the same underlying state. Each instance is independent,
/// so tests and short-lived tools get their own store instead of a global.
/// Mirrors the relational constraints of the PostgreSQL schema: sibling
/// names are unique, and rows still referenced by child folders or test
/// cases cannot be removed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    /// Folder arena keyed by ID.
    folders: HashMap<Uuid, Folder>,
    /// Child IDs per sibling set.
    children: HashMap<SiblingKey, Vec<Uuid>>,
    /// Test cases keyed by ID.
    testcases: HashMap<Uuid, TestCase>,
}

impl StoreState {
    fn name_taken(&self, key: &SiblingKey, name: &str, except: Option<Uuid>) -> bool {
        self.children.get(key).is_some_and(|ids| {
            ids.iter()
                .filter(|id| Some(**id) != except)
                .filter_map(|id| self.folders.get(id))
                .any(|f| f.name == name)
        })
    }

    fn unlink(&mut self, key: &SiblingKey, id: Uuid) {
        if let Some(ids) = self.children.get_mut(key) {
            ids.retain(|child| *child != id);
            if ids.is_empty() {
                self.children.remove(key);
            }
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// File a new test case, optionally inside a folder.
    pub async fn insert_testcase(
        &self,
        project_id: Uuid,
        folder_id: Option<Uuid>,
        title: &str,
    ) -> TestCase {
        let now = Utc::now();
        let testcase = TestCase {
            id: Uuid::new_v4(),
            project_id,
            folder_id,
            title: title.to_string(),
            created_by: Uuid::nil(),
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.write().await;
        state.testcases.insert(testcase.id, testcase.clone());
        testcase
    }

    /// Look up a test case by ID.
    pub async fn testcase(&self, id: Uuid) -> Option<TestCase> {
        self.state.read().await.testcases.get(&id).cloned()
    }

    /// Number of folder rows currently stored.
    pub async fn folder_count(&self) -> usize {
        self.state.read().await.folders.len()
    }
}

#[async_trait]
impl FolderRepository for MemoryStore {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut state = self.state.write().await;
        let key = (data.project_id, data.parent_id);

        if let Some(parent_id) = data.parent_id {
            if !state.folders.contains_key(&parent_id) {
                return Err(AppError::not_found(format!(
                    "Parent folder {parent_id} does not exist"
                )));
            }
        }
        if state.name_taken(&key, &data.name, None) {
            return Err(AppError::already_exists(format!(
                "A sibling folder named '{}' already exists",
                data.name
            )));
        }

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            description: data.description.clone(),
            order_index: data.order_index,
            depth: data.depth,
            created_by: data.created_by,
            is_locked: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };

        state.children.entry(key).or_default().push(folder.id);
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn list_by_parent(
        &self,
        parent_id: Option<Uuid>,
        project_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut folders: Vec<Folder> = state
            .children
            .get(&(project_id, parent_id))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.folders.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        folders.sort_by_key(|f| (f.order_index, f.id));
        Ok(folders)
    }

    async fn update(&self, id: Uuid, patch: &FolderPatch) -> AppResult<Option<Folder>> {
        let mut state = self.state.write().await;
        let Some(current) = state.folders.get(&id).cloned() else {
            return Ok(None);
        };

        let mut updated = current.clone();
        patch.apply(&mut updated);

        let old_key = (current.project_id, current.parent_id);
        let new_key = (updated.project_id, updated.parent_id);

        if let Some(parent_id) = updated.parent_id {
            if parent_id == id {
                return Err(AppError::validation(format!(
                    "Folder {id} cannot be its own parent"
                )));
            }
            if !state.folders.contains_key(&parent_id) {
                return Err(AppError::not_found(format!(
                    "Parent folder {parent_id} does not exist"
                )));
            }
        }
        if (old_key != new_key || updated.name != current.name)
            && state.name_taken(&new_key, &updated.name, Some(id))
        {
            return Err(AppError::already_exists(format!(
                "A sibling folder named '{}' already exists",
                updated.name
            )));
        }

        if old_key != new_key {
            state.unlink(&old_key, id);
            state.children.entry(new_key).or_default().push(id);
        }
        state.folders.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(folder) = state.folders.get(&id).cloned() else {
            return Ok(false);
        };

        if state.children.contains_key(&(folder.project_id, Some(id))) {
            return Err(AppError::conflict(format!(
                "Folder {id} still has child folders"
            )));
        }
        if state.testcases.values().any(|t| t.folder_id == Some(id)) {
            return Err(AppError::conflict(format!(
                "Folder {id} still contains test cases"
            )));
        }

        state.unlink(&(folder.project_id, folder.parent_id), id);
        state.folders.remove(&id);
        debug!(folder_id = %id, "Removed folder row");
        Ok(true)
    }
}

#[async_trait]
impl TestCaseRepository for MemoryStore {
    async fn detach_folder(&self, folder_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut detached = 0;
        for testcase in state.testcases.values_mut() {
            if testcase.folder_id == Some(folder_id) {
                testcase.folder_id = None;
                testcase.updated_at = now;
                detached += 1;
            }
        }
        Ok(detached)
    }

    async fn count_by_folders(&self, folder_ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for testcase in state.testcases.values() {
            if let Some(folder_id) = testcase.folder_id {
                if folder_ids.contains(&folder_id) {
                    *counts.entry(folder_id).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use testhub_core::error::ErrorKind;

    use super::*;

    fn new_folder(project_id: Uuid, parent_id: Option<Uuid>, name: &str, order: i64) -> CreateFolder {
        CreateFolder {
            project_id,
            parent_id,
            name: name.to_string(),
            description: None,
            order_index: order,
            depth: 0,
            created_by: Uuid::nil(),
        }
    }

    #[tokio::test]
    async fn test_list_by_parent_orders_by_index() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        store.create(&new_folder(project, None, "b", 200)).await.unwrap();
        store.create(&new_folder(project, None, "a", 100)).await.unwrap();
        store.create(&new_folder(project, None, "c", 300)).await.unwrap();

        let names: Vec<String> = store
            .list_by_parent(None, project)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_sibling_names_are_scoped_by_project_and_parent() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        let root = store.create(&new_folder(project, None, "Suite", 100)).await.unwrap();

        let dup = store.create(&new_folder(project, None, "Suite", 200)).await;
        assert_eq!(dup.unwrap_err().kind, ErrorKind::AlreadyExists);

        assert!(store.create(&new_folder(project, Some(root.id), "Suite", 100)).await.is_ok());
        assert!(store.create(&new_folder(Uuid::new_v4(), None, "Suite", 100)).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_or_self_parent_is_not_a_name_clash() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();

        let orphan = store
            .create(&new_folder(project, Some(Uuid::new_v4()), "Orphan", 100))
            .await;
        assert_eq!(orphan.unwrap_err().kind, ErrorKind::NotFound);

        let folder = store.create(&new_folder(project, None, "Loop", 100)).await.unwrap();
        let patch = FolderPatch {
            parent_id: Some(Some(folder.id)),
            ..FolderPatch::default()
        };
        let err = store.update(folder.id, &patch).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let patch = FolderPatch {
            parent_id: Some(Some(Uuid::new_v4())),
            ..FolderPatch::default()
        };
        let err = store.update(folder.id, &patch).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_reindexes_parent() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        let a = store.create(&new_folder(project, None, "a", 100)).await.unwrap();
        let b = store.create(&new_folder(project, None, "b", 200)).await.unwrap();

        let patch = FolderPatch {
            parent_id: Some(Some(a.id)),
            depth: Some(1),
            ..FolderPatch::default()
        };
        store.update(b.id, &patch).await.unwrap().unwrap();

        assert_eq!(store.list_by_parent(None, project).await.unwrap().len(), 1);
        let children = store.list_by_parent(Some(a.id), project).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].depth, 1);
    }

    #[tokio::test]
    async fn test_delete_refuses_referenced_rows() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        let parent = store.create(&new_folder(project, None, "p", 100)).await.unwrap();
        let child = store
            .create(&new_folder(project, Some(parent.id), "c", 100))
            .await
            .unwrap();
        let case = store.insert_testcase(project, Some(child.id), "login works").await;

        assert!(store.delete(parent.id).await.is_err());
        assert!(store.delete(child.id).await.is_err());

        assert_eq!(store.detach_folder(child.id).await.unwrap(), 1);
        assert!(store.delete(child.id).await.unwrap());
        assert!(store.delete(parent.id).await.unwrap());
        assert!(!store.delete(parent.id).await.unwrap());
        assert_eq!(store.testcase(case.id).await.unwrap().folder_id, None);
    }

    #[tokio::test]
    async fn test_count_by_folders() {
        let store = MemoryStore::new();
        let project = Uuid::new_v4();
        let f = store.create(&new_folder(project, None, "f", 100)).await.unwrap();
        store.insert_testcase(project, Some(f.id), "one").await;
        store.insert_testcase(project, Some(f.id), "two").await;
        store.insert_testcase(project, None, "loose").await;

        let counts = store.count_by_folders(&[f.id]).await.unwrap();
        assert_eq!(counts.get(&f.id), Some(&2));
    }
}
