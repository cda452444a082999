//! Folder name rules shared by create, rename and move.

use validator::ValidationErrors;

use super::error::FolderError;

/// Rejects names that are empty or only whitespace.
///
/// Length limits are declared on the request structs.
pub fn ensure_not_blank(name: &str) -> Result<(), FolderError> {
    if name.trim().is_empty() {
        return Err(FolderError::InvalidName(
            "Folder name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl From<ValidationErrors> for FolderError {
    fn from(errors: ValidationErrors) -> Self {
        FolderError::InvalidName(errors.to_string())
    }
}
