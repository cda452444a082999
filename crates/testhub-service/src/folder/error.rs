//! Typed failures of the folder engine.
//!
//! Every rejection is a variant of [`FolderError`]. Batch callers get a
//! [`FailureReason`] derived by matching on the variant, so no message text
//! is ever parsed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use testhub_core::error::{AppError, ErrorKind};

/// Errors raised by folder operations.
#[derive(Debug, Clone, Error)]
pub enum FolderError {
    /// The folder (or a folder it refers to) does not exist in the project.
    #[error("Folder {0} not found")]
    FolderNotFound(Uuid),

    /// A folder was proposed as its own parent.
    #[error("Folder {0} cannot be its own parent")]
    SelfParent(Uuid),

    /// The proposed parent lives inside the moving folder's subtree.
    #[error("Cannot move folder {folder_id} into its descendant {target_id}")]
    DescendantCycle {
        /// The folder being moved.
        folder_id: Uuid,
        /// The descendant proposed as new parent.
        target_id: Uuid,
    },

    /// The operation would place a folder deeper than allowed.
    #[error("Folder depth {depth} exceeds the maximum of {max}")]
    DepthExceeded {
        /// The deepest depth the operation would produce.
        depth: i32,
        /// Configured maximum depth.
        max: i32,
    },

    /// A sibling under the same parent already uses the name.
    #[error("A folder named '{name}' already exists under this parent")]
    NameConflict {
        /// The colliding name.
        name: String,
    },

    /// The folder name failed validation.
    #[error("Invalid folder name: {0}")]
    InvalidName(String),

    /// The folder is locked against mutation.
    #[error("Folder {0} is locked")]
    Locked(Uuid),

    /// The folder is archived and cannot be used for this operation.
    #[error("Folder {0} is archived")]
    Archived(Uuid),

    /// The caller may not perform the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A batch exceeded the configured size limit.
    #[error("Batch of {size} items exceeds the limit of {max}")]
    BatchTooLarge {
        /// Items submitted.
        size: usize,
        /// Configured limit.
        max: usize,
    },

    /// A cascading delete stopped part-way through a subtree.
    #[error("Delete of folder {folder_id} stopped after {processed} folders: {message}")]
    CascadeIncomplete {
        /// Root of the cascade.
        folder_id: Uuid,
        /// Folders fully processed before the failure.
        processed: usize,
        /// The underlying failure.
        message: String,
    },

    /// A storage failure.
    #[error(transparent)]
    Repository(#[from] AppError),
}

/// Error taxonomy shared with the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input that can never succeed as given.
    Validation,
    /// Input that conflicts with the current state of the tree.
    State,
    /// A referenced folder is missing.
    NotFound,
    /// The caller lacks permission.
    Permission,
    /// Anything else.
    Unknown,
}

/// Machine-readable reason attached to each failed batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    /// The folder, target parent, or relative folder does not exist.
    FolderNotFound,
    /// The move would create a cycle.
    CyclicMove,
    /// The caller lacks permission.
    PermissionDenied,
    /// A sibling already uses the name.
    NameConflict,
    /// The folder is locked.
    Locked,
    /// The folder or target is archived.
    Archived,
    /// Any other failure.
    UnknownError,
}

impl FailureReason {
    /// Wire code of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FolderNotFound => "FOLDER_NOT_FOUND",
            Self::CyclicMove => "CYCLIC_MOVE",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NameConflict => "NAME_CONFLICT",
            Self::Locked => "LOCKED",
            Self::Archived => "ARCHIVED",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FolderError {
    /// Category of the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NameConflict { .. }
            | Self::DepthExceeded { .. }
            | Self::InvalidName(_)
            | Self::BatchTooLarge { .. } => ErrorCategory::Validation,
            Self::SelfParent(_)
            | Self::DescendantCycle { .. }
            | Self::Locked(_)
            | Self::Archived(_)
            | Self::CascadeIncomplete { .. } => ErrorCategory::State,
            Self::FolderNotFound(_) => ErrorCategory::NotFound,
            Self::PermissionDenied(_) => ErrorCategory::Permission,
            Self::Repository(e) => match e.kind {
                ErrorKind::NotFound => ErrorCategory::NotFound,
                ErrorKind::Authorization => ErrorCategory::Permission,
                ErrorKind::Validation | ErrorKind::AlreadyExists => ErrorCategory::Validation,
                ErrorKind::Conflict => ErrorCategory::State,
                _ => ErrorCategory::Unknown,
            },
        }
    }

    /// Batch reason code for the error.
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::FolderNotFound(_) => FailureReason::FolderNotFound,
            Self::SelfParent(_) | Self::DescendantCycle { .. } => FailureReason::CyclicMove,
            Self::PermissionDenied(_) => FailureReason::PermissionDenied,
            Self::NameConflict { .. } => FailureReason::NameConflict,
            Self::Locked(_) => FailureReason::Locked,
            Self::Archived(_) => FailureReason::Archived,
            Self::Repository(e) => match e.kind {
                ErrorKind::NotFound => FailureReason::FolderNotFound,
                ErrorKind::Authorization => FailureReason::PermissionDenied,
                ErrorKind::AlreadyExists => FailureReason::NameConflict,
                _ => FailureReason::UnknownError,
            },
            Self::DepthExceeded { .. }
            | Self::InvalidName(_)
            | Self::BatchTooLarge { .. }
            | Self::CascadeIncomplete { .. } => FailureReason::UnknownError,
        }
    }
}

impl From<FolderError> for AppError {
    fn from(err: FolderError) -> Self {
        match err {
            FolderError::Repository(e) => e,
            other => {
                let kind = match other.category() {
                    ErrorCategory::Validation => match other {
                        FolderError::NameConflict { .. } => ErrorKind::AlreadyExists,
                        _ => ErrorKind::Validation,
                    },
                    ErrorCategory::State => ErrorKind::Conflict,
                    ErrorCategory::NotFound => ErrorKind::NotFound,
                    ErrorCategory::Permission => ErrorKind::Authorization,
                    ErrorCategory::Unknown => ErrorKind::Internal,
                };
                AppError::new(kind, other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_variants_share_reason() {
        let id = Uuid::new_v4();
        assert_eq!(FolderError::SelfParent(id).reason(), FailureReason::CyclicMove);
        assert_eq!(
            FolderError::DescendantCycle {
                folder_id: id,
                target_id: Uuid::new_v4()
            }
            .reason(),
            FailureReason::CyclicMove
        );
    }

    #[test]
    fn test_repository_errors_classify_by_kind() {
        let taken = FolderError::from(AppError::already_exists("duplicate"));
        assert_eq!(taken.reason(), FailureReason::NameConflict);
        assert_eq!(taken.category(), ErrorCategory::Validation);

        let missing_parent = FolderError::from(AppError::not_found("parent gone"));
        assert_eq!(missing_parent.reason(), FailureReason::FolderNotFound);

        let referenced = FolderError::from(AppError::conflict("still referenced"));
        assert_eq!(referenced.reason(), FailureReason::UnknownError);
        assert_eq!(referenced.category(), ErrorCategory::State);

        let db = FolderError::from(AppError::database("connection reset"));
        assert_eq!(db.reason(), FailureReason::UnknownError);
        assert_eq!(db.category(), ErrorCategory::Unknown);
    }

    #[test]
    fn test_reason_wire_format() {
        let json = serde_json::to_string(&FailureReason::FolderNotFound).unwrap();
        assert_eq!(json, "\"FOLDER_NOT_FOUND\"");
        assert_eq!(FailureReason::CyclicMove.to_string(), "CYCLIC_MOVE");
    }

    #[test]
    fn test_into_app_error_kinds() {
        let id = Uuid::new_v4();
        assert_eq!(AppError::from(FolderError::FolderNotFound(id)).kind, ErrorKind::NotFound);
        assert_eq!(AppError::from(FolderError::Locked(id)).kind, ErrorKind::Conflict);
        assert_eq!(
            AppError::from(FolderError::DepthExceeded { depth: 11, max: 10 }).kind,
            ErrorKind::Validation
        );
        assert_eq!(
            AppError::from(FolderError::NameConflict {
                name: "x".to_string()
            })
            .kind,
            ErrorKind::AlreadyExists
        );
    }
}
