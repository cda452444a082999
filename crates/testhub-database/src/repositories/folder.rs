//! PostgreSQL folder repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use testhub_core::error::{AppError, ErrorKind};
use testhub_core::result::AppResult;
use testhub_entity::folder::{CreateFolder, Folder, FolderPatch};

use crate::traits::FolderRepository;

/// Unique constraint guarding sibling names.
const SIBLING_NAME_CONSTRAINT: &str = "folders_sibling_name_key";

/// Repository for folder rows stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map an insert or update error.
///
/// A sibling-name violation is `AlreadyExists`; a foreign key violation
/// means the parent row is gone.
fn map_write_error(e: sqlx::Error, name: &str, action: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(SIBLING_NAME_CONSTRAINT) => {
            AppError::already_exists(format!("A sibling folder named '{name}' already exists"))
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found(format!("{action}: parent folder does not exist"))
        }
        _ => AppError::with_source(ErrorKind::Database, action, e),
    }
}

/// Map a delete error. Foreign key violations mean rows still point here.
fn map_delete_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::conflict("Failed to delete folder: folder is still referenced")
        }
        _ => AppError::with_source(ErrorKind::Database, "Failed to delete folder", e),
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (project_id, parent_id, name, description, order_index, depth, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.project_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.order_index)
        .bind(data.depth)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &data.name, "Failed to create folder"))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn list_by_parent(
        &self,
        parent_id: Option<Uuid>,
        project_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE project_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY order_index ASC, id ASC",
        )
        .bind(project_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    async fn update(&self, id: Uuid, patch: &FolderPatch) -> AppResult<Option<Folder>> {
        let Some(mut folder) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(folder));
        }
        patch.apply(&mut folder);

        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, name = $3, description = $4, order_index = $5, \
             depth = $6, is_locked = $7, is_archived = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(folder.parent_id)
        .bind(&folder.name)
        .bind(&folder.description)
        .bind(folder.order_index)
        .bind(folder.depth)
        .bind(folder.is_locked)
        .bind(folder.is_archived)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &folder.name, "Failed to update folder"))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }
}
