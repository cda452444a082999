//! Sequential, best-effort batch moves.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use testhub_core::types::double_option;
use testhub_entity::folder::Folder;

use crate::context::RequestContext;

use super::error::{FailureReason, FolderError};
use super::mover::{DropType, FolderMoveEngine, MoveFolderRequest};

/// One entry of a batch move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMoveItem {
    /// Folder to move.
    pub id: Uuid,
    /// New parent; see [`MoveFolderRequest::target_parent_id`].
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option::deserialize"
    )]
    pub target_parent_id: Option<Option<Uuid>>,
    /// Placement relative to `relative_to_id`.
    #[serde(default)]
    pub drop_type: DropType,
    /// Sibling the drop is relative to.
    #[serde(default)]
    pub relative_to_id: Option<Uuid>,
    /// Explicit order index requested by the client.
    #[serde(default)]
    pub order_index: Option<i64>,
}

impl BatchMoveItem {
    fn to_request(&self) -> MoveFolderRequest {
        MoveFolderRequest {
            target_parent_id: self.target_parent_id,
            drop_type: self.drop_type,
            relative_to_id: self.relative_to_id,
            order_index: self.order_index,
            name: None,
        }
    }
}

/// A successfully moved item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMoveSuccess {
    /// The folder ID from the request.
    pub id: Uuid,
    /// The folder after the move.
    pub folder: Folder,
}

/// A failed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMoveFailure {
    /// The folder ID from the request.
    pub id: Uuid,
    /// Human-readable message of the underlying error.
    pub error: String,
    /// Machine-readable reason code.
    pub reason: FailureReason,
}

/// Per-item outcome of a batch move.
///
/// Every submitted item lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchMoveResult {
    /// Items that were applied, in input order.
    pub success: Vec<BatchMoveSuccess>,
    /// Items that were rejected, in input order.
    pub failed: Vec<BatchMoveFailure>,
}

impl BatchMoveResult {
    /// Number of items accounted for.
    pub fn total(&self) -> usize {
        self.success.len() + self.failed.len()
    }
}

/// Applies a list of moves one after another.
///
/// Items run in input order, never concurrently, so later items see the
/// effect of earlier ones. A failed item does not stop the batch and
/// nothing already applied is rolled back.
#[derive(Debug, Clone)]
pub struct BatchMoveCoordinator {
    engine: Arc<FolderMoveEngine>,
    max_batch_size: usize,
}

impl BatchMoveCoordinator {
    /// Creates a new coordinator.
    pub fn new(engine: Arc<FolderMoveEngine>, max_batch_size: usize) -> Self {
        Self {
            engine,
            max_batch_size,
        }
    }

    /// Moves every item, collecting per-item outcomes.
    ///
    /// The only error returned for the batch as a whole is
    /// [`FolderError::BatchTooLarge`], raised before any item runs.
    pub async fn move_batch(
        &self,
        ctx: &RequestContext,
        items: &[BatchMoveItem],
    ) -> Result<BatchMoveResult, FolderError> {
        if items.len() > self.max_batch_size {
            return Err(FolderError::BatchTooLarge {
                size: items.len(),
                max: self.max_batch_size,
            });
        }

        let mut result = BatchMoveResult::default();

        for item in items {
            match self.engine.move_folder(ctx, item.id, &item.to_request()).await {
                Ok(folder) => result.success.push(BatchMoveSuccess {
                    id: item.id,
                    folder,
                }),
                Err(e) => {
                    let reason = e.reason();
                    warn!(
                        user_id = %ctx.user_id,
                        folder_id = %item.id,
                        reason = %reason,
                        error = %e,
                        "Batch move item failed"
                    );
                    result.failed.push(BatchMoveFailure {
                        id: item.id,
                        error: e.to_string(),
                        reason,
                    });
                }
            }
        }

        self.engine.locks().prune();

        info!(
            user_id = %ctx.user_id,
            total = items.len(),
            succeeded = result.success.len(),
            failed = result.failed.len(),
            "Batch move finished"
        );

        Ok(result)
    }
}
