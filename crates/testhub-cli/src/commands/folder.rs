//! Folder management CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use testhub_core::config::AppConfig;
use testhub_core::error::AppError;
use testhub_database::DatabasePool;
use testhub_entity::folder::Folder;
use testhub_service::RequestContext;
use testhub_service::folder::{
    BatchMoveItem, BatchMoveResult, CreateFolderRequest, DeleteMode, DeleteOptions, DropType,
    FolderService, MoveFolderRequest, TreeQuery, UpdateFolderRequest,
};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Acting user recorded on created folders and in logs
    #[arg(long, global = true)]
    pub user_id: Option<Uuid>,

    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create a new folder
    Create {
        /// Project ID
        #[arg(short, long)]
        project_id: Uuid,
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(long)]
        parent_id: Option<Uuid>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show folder tree
    Tree {
        /// Project ID
        #[arg(short, long)]
        project_id: Uuid,
        /// Max depth (0 = roots only)
        #[arg(short, long)]
        depth: Option<u32>,
        /// Include archived folders
        #[arg(long)]
        all: bool,
    },
    /// Move or reorder a folder
    Move {
        /// Folder ID
        id: Uuid,
        /// New parent folder ID
        #[arg(long, conflicts_with = "root")]
        parent_id: Option<Uuid>,
        /// Move to the root level
        #[arg(long)]
        root: bool,
        /// Place directly before this sibling
        #[arg(long, conflicts_with = "after")]
        before: Option<Uuid>,
        /// Place directly after this sibling
        #[arg(long)]
        after: Option<Uuid>,
        /// Explicit order index
        #[arg(long)]
        index: Option<i64>,
        /// Rename while moving
        #[arg(long)]
        name: Option<String>,
    },
    /// Apply a JSON list of moves
    MoveBatch {
        /// File holding a JSON array of move items
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a folder and its subtree
    Delete {
        /// Folder ID
        id: Uuid,
        /// Remove rows instead of archiving them
        #[arg(long)]
        hard: bool,
        /// Ignore locked folders in the subtree
        #[arg(long)]
        force: bool,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Restore an archived folder and its subtree
    Restore {
        /// Folder ID
        id: Uuid,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: Uuid,
        /// New name
        name: String,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Parent
    parent: String,
    /// Order index
    order: i64,
    /// Depth
    depth: i32,
    /// Status
    status: String,
    /// Updated at
    updated_at: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            parent: f.parent_id.map_or_else(|| "-".to_string(), |p| p.to_string()),
            order: f.order_index,
            depth: f.depth,
            status: format!("{:?}", f.status()).to_lowercase(),
            updated_at: f.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Failed batch item display row
#[derive(Debug, Serialize, Tabled)]
struct FailureRow {
    /// Folder ID
    id: String,
    /// Reason code
    reason: String,
    /// Message
    error: String,
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    pool: &DatabasePool,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let service = FolderService::new(
        pool.folder_repository(),
        pool.testcase_repository(),
        &config.folders,
    );
    let username = std::env::var("USER").unwrap_or_else(|_| "cli".to_string());
    let ctx = RequestContext::new(args.user_id.unwrap_or_else(Uuid::nil), username);

    match &args.command {
        FolderCommand::Create {
            project_id,
            name,
            parent_id,
            description,
        } => {
            let folder = service
                .create_folder(
                    &ctx,
                    CreateFolderRequest {
                        project_id: *project_id,
                        parent_id: *parent_id,
                        name: name.clone(),
                        description: description.clone(),
                    },
                )
                .await?;
            print_folder(&folder, format, "created");
        }
        FolderCommand::Tree {
            project_id,
            depth,
            all,
        } => {
            let tree = service
                .get_folder_tree(
                    *project_id,
                    TreeQuery {
                        depth: *depth,
                        include_archived: *all,
                    },
                )
                .await?;
            output::print_tree(&tree, format);
        }
        FolderCommand::Move {
            id,
            parent_id,
            root,
            before,
            after,
            index,
            name,
        } => {
            let target_parent_id = match (parent_id, root) {
                (_, true) => Some(None),
                (Some(parent_id), false) => Some(Some(*parent_id)),
                (None, false) => None,
            };
            let (drop_type, relative_to_id) = match (before, after) {
                (Some(sibling), _) => (DropType::Before, Some(*sibling)),
                (None, Some(sibling)) => (DropType::After, Some(*sibling)),
                (None, None) => (DropType::Into, None),
            };
            let req = MoveFolderRequest {
                target_parent_id,
                drop_type,
                relative_to_id,
                order_index: *index,
                name: name.clone(),
            };
            let folder = service.move_folder(&ctx, *id, &req).await?;
            print_folder(&folder, format, "moved");
        }
        FolderCommand::MoveBatch { file } => {
            let raw = tokio::fs::read_to_string(file).await?;
            let items: Vec<BatchMoveItem> = serde_json::from_str(&raw)?;
            let result = service.move_folder_batch(&ctx, &items).await?;
            print_batch(&result, format);
        }
        FolderCommand::Delete {
            id,
            hard,
            force,
            yes,
        } => {
            let options = DeleteOptions {
                mode: if *hard {
                    DeleteMode::Hard
                } else {
                    DeleteMode::Soft
                },
                force: *force,
            };

            if *hard && !*yes && !confirm_hard_delete(&service, *id).await? {
                println!("Cancelled.");
                return Ok(());
            }

            if service.delete_folder(&ctx, *id, options).await? {
                output::print_success(&format!("Folder {id} deleted ({:?})", options.mode));
            } else {
                output::print_warning(&format!("Folder {id} does not exist"));
            }
        }
        FolderCommand::Restore { id } => {
            let folder = service.restore_folder(&ctx, *id).await?;
            print_folder(&folder, format, "restored");
        }
        FolderCommand::Rename { id, name } => {
            let folder = service
                .update_folder(&ctx, *id, UpdateFolderRequest::rename(name.clone()))
                .await?;
            print_folder(&folder, format, "renamed");
        }
    }

    Ok(())
}

async fn confirm_hard_delete(service: &FolderService, id: Uuid) -> Result<bool, AppError> {
    let crumbs = service.get_breadcrumbs(id).await.unwrap_or_default();
    let path = crumbs
        .iter()
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join("/");
    let target = if path.is_empty() { id.to_string() } else { path };

    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Permanently remove '{target}' and every folder below it? Test cases will be unfiled."
        ))
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

fn print_folder(folder: &Folder, format: OutputFormat, action: &str) {
    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Folder '{}' {action}", folder.name));
            output::print_list(&[FolderRow::from(folder)], format);
        }
        OutputFormat::Json => output::print_json(folder),
    }
}

fn print_batch(result: &BatchMoveResult, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            output::print_success(&format!(
                "{} of {} moves applied",
                result.success.len(),
                result.total()
            ));
            if !result.failed.is_empty() {
                let rows: Vec<FailureRow> = result
                    .failed
                    .iter()
                    .map(|f| FailureRow {
                        id: f.id.to_string(),
                        reason: f.reason.to_string(),
                        error: f.error.clone(),
                    })
                    .collect();
                output::print_list(&rows, format);
            }
        }
        OutputFormat::Json => output::print_json(result),
    }
}
