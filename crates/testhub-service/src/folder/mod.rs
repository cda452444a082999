//! Folder hierarchy: ordering, moves, batch moves, deletion and trees.

pub mod batch;
pub mod cascade;
pub mod error;
pub mod guard;
pub mod locks;
pub mod mover;
pub mod naming;
pub mod ordering;
pub mod service;
pub mod tree;

pub use batch::{
    BatchMoveCoordinator, BatchMoveFailure, BatchMoveItem, BatchMoveResult, BatchMoveSuccess,
};
pub use cascade::{DeleteMode, DeleteOptions, FolderDeletionCascade};
pub use error::{ErrorCategory, FailureReason, FolderError};
pub use guard::CycleGuard;
pub use locks::SiblingLocks;
pub use mover::{DropType, FolderMoveEngine, MoveFolderRequest};
pub use ordering::OrderIndexAllocator;
pub use service::{CreateFolderRequest, FolderService, UpdateFolderRequest};
pub use tree::{TreeQuery, TreeService};
