//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use testhub_core::error::AppError;
use testhub_database::{DatabasePool, migration};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the database answers and the folder schema is current
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, pool: &DatabasePool) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            migration::run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            if !pool.health_check().await? {
                output::print_warning("Database did not answer the health check.");
                return Ok(());
            }

            let status = migration::schema_status(pool.pool()).await?;
            for table in &status.missing_tables {
                output::print_warning(&format!("Missing table: {table}"));
            }
            for pending in &status.pending {
                output::print_warning(&format!("Pending migration: {pending}"));
            }
            if status.is_ready() {
                output::print_success("Database is reachable and the folder schema is current.");
            } else {
                println!("Run `testhub migrate run` to bring the schema up to date.");
            }
        }
    }

    Ok(())
}
