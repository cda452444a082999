//! Schema migrations and readiness checks for the folder tables.

use std::collections::HashSet;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::{info, warn};

use testhub_core::error::{AppError, ErrorKind};

/// Migrations embedded from the workspace `migrations/` directory.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Tables the folder engine reads and writes.
pub const REQUIRED_TABLES: [&str; 2] = ["folders", "test_cases"];

/// What `migrate check` reports about a database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaStatus {
    /// Required tables that do not exist.
    pub missing_tables: Vec<&'static str>,
    /// Descriptions of embedded migrations not yet applied, oldest first.
    pub pending: Vec<String>,
}

impl SchemaStatus {
    /// Whether the folder engine can run against this database.
    pub fn is_ready(&self) -> bool {
        self.missing_tables.is_empty() && self.pending.is_empty()
    }
}

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(embedded = MIGRATOR.iter().count(), "Applying folder schema migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Folder schema is up to date");
    Ok(())
}

/// Inspect the database without changing it.
pub async fn schema_status(pool: &PgPool) -> Result<SchemaStatus, AppError> {
    let mut missing_tables = Vec::new();
    for table in REQUIRED_TABLES {
        if !table_exists(pool, table).await? {
            missing_tables.push(table);
        }
    }

    let applied: HashSet<i64> = if table_exists(pool, "_sqlx_migrations").await? {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read applied migrations", e)
            })?
            .into_iter()
            .collect()
    } else {
        HashSet::new()
    };

    let status = SchemaStatus {
        missing_tables,
        pending: pending_migrations(&applied),
    };
    if !status.is_ready() {
        warn!(
            missing = ?status.missing_tables,
            pending = status.pending.len(),
            "Folder schema is not ready"
        );
    }
    Ok(status)
}

fn pending_migrations(applied: &HashSet<i64>) -> Vec<String> {
    MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .filter(|m| !applied.contains(&m.version))
        .map(|m| format!("{} {}", m.version, m.description))
        .collect()
}

async fn table_exists(pool: &PgPool, table: &str) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, bool>("SELECT to_regclass($1) IS NOT NULL")
        .bind(table)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to look up table {table}"),
                e,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_has_everything_pending() {
        let pending = pending_migrations(&HashSet::new());
        assert_eq!(pending.len(), MIGRATOR.iter().count());
        assert!(pending[0].contains("folders"));
    }

    #[test]
    fn test_applied_migrations_are_not_pending() {
        let applied: HashSet<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert!(pending_migrations(&applied).is_empty());
    }

    #[test]
    fn test_ready_needs_tables_and_migrations() {
        assert!(SchemaStatus::default().is_ready());

        let missing = SchemaStatus {
            missing_tables: vec!["test_cases"],
            ..SchemaStatus::default()
        };
        assert!(!missing.is_ready());

        let behind = SchemaStatus {
            pending: vec!["20240101000000 folders".to_string()],
            ..SchemaStatus::default()
        };
        assert!(!behind.is_ready());
    }
}
