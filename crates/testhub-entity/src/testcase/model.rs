//! Test case entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A test case filed under a folder.
///
/// The folder engine only ever touches `folder_id`: hard-deleting a folder
/// detaches its test cases instead of removing them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestCase {
    /// Unique test case identifier.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Containing folder (None once detached or never filed).
    pub folder_id: Option<Uuid>,
    /// Test case title.
    pub title: String,
    /// The user who created the test case.
    pub created_by: Uuid,
    /// When the test case was created.
    pub created_at: DateTime<Utc>,
    /// When the test case was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TestCase {
    /// Check if the test case sits in a folder.
    pub fn is_filed(&self) -> bool {
        self.folder_id.is_some()
    }
}
