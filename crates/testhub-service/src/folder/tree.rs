//! Folder tree building and ancestry lookups.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use testhub_database::{FolderRepository, TestCaseRepository};
use testhub_entity::folder::{Folder, FolderTree};

use super::error::FolderError;

/// Options for [`TreeService::get_folder_tree`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TreeQuery {
    /// Deepest level to include (0 = roots only). Unbounded when `None`.
    #[serde(default)]
    pub depth: Option<u32>,
    /// Include archived folders and their subtrees.
    #[serde(default)]
    pub include_archived: bool,
}

/// Builds folder trees and resolves ancestry.
#[derive(Debug, Clone)]
pub struct TreeService {
    folder_repo: Arc<dyn FolderRepository>,
    testcase_repo: Arc<dyn TestCaseRepository>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(
        folder_repo: Arc<dyn FolderRepository>,
        testcase_repo: Arc<dyn TestCaseRepository>,
    ) -> Self {
        Self {
            folder_repo,
            testcase_repo,
        }
    }

    /// Builds the folder forest of a project.
    pub async fn get_folder_tree(
        &self,
        project_id: Uuid,
        query: TreeQuery,
    ) -> Result<Vec<FolderTree>, FolderError> {
        // Load level by level into a flat arena, grouped by parent.
        let mut arena: Vec<Folder> = Vec::new();
        let mut by_parent: HashMap<Option<Uuid>, Vec<usize>> = HashMap::new();
        let mut frontier: Vec<Option<Uuid>> = vec![None];
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut level = 0u32;

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for parent_id in frontier {
                let children = self
                    .folder_repo
                    .list_by_parent(parent_id, project_id)
                    .await?;
                for child in children {
                    if (child.is_archived && !query.include_archived) || !seen.insert(child.id) {
                        continue;
                    }
                    if query.depth.is_none_or(|max| level < max) {
                        next.push(Some(child.id));
                    }
                    by_parent.entry(parent_id).or_default().push(arena.len());
                    arena.push(child);
                }
            }
            frontier = next;
            level += 1;
        }

        let ids: Vec<Uuid> = arena.iter().map(|f| f.id).collect();
        let counts = self.testcase_repo.count_by_folders(&ids).await?;

        Ok(build_level(None, &arena, &by_parent, &counts))
    }

    /// Gets the chain of folders from the root down to `folder_id`.
    pub async fn get_breadcrumbs(&self, folder_id: Uuid) -> Result<Vec<Folder>, FolderError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(folder_id);

        while let Some(id) = cursor {
            if !seen.insert(id) {
                break;
            }
            let folder = self
                .folder_repo
                .get_by_id(id)
                .await?
                .ok_or(FolderError::FolderNotFound(id))?;
            cursor = folder.parent_id;
            chain.push(folder);
        }

        chain.reverse();
        Ok(chain)
    }
}

/// Builds the nodes whose parent is `parent_id` from the grouped arena.
fn build_level(
    parent_id: Option<Uuid>,
    arena: &[Folder],
    by_parent: &HashMap<Option<Uuid>, Vec<usize>>,
    counts: &HashMap<Uuid, u64>,
) -> Vec<FolderTree> {
    by_parent
        .get(&parent_id)
        .map(|indices| {
            indices
                .iter()
                .map(|&i| {
                    let folder = &arena[i];
                    let children = build_level(Some(folder.id), arena, by_parent, counts);
                    let count = counts.get(&folder.id).copied().unwrap_or(0);
                    FolderTree::from_folder(folder, count, children)
                })
                .collect()
        })
        .unwrap_or_default()
}
