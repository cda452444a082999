//! PostgreSQL test case repository (folder-facing queries only).

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use testhub_core::error::{AppError, ErrorKind};
use testhub_core::result::AppResult;

use crate::traits::TestCaseRepository;

/// Repository for test case rows stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgTestCaseRepository {
    pool: PgPool,
}

impl PgTestCaseRepository {
    /// Create a new test case repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestCaseRepository for PgTestCaseRepository {
    async fn detach_folder(&self, folder_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE test_cases SET folder_id = NULL, updated_at = NOW() WHERE folder_id = $1",
        )
        .bind(folder_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to detach test cases", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn count_by_folders(&self, folder_ids: &[Uuid]) -> AppResult<HashMap<Uuid, u64>> {
        if folder_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT folder_id, COUNT(*) FROM test_cases \
             WHERE folder_id = ANY($1) GROUP BY folder_id",
        )
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count test cases", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count as u64))
            .collect())
    }
}
