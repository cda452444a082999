//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current request.
///
/// Built by the caller (HTTP middleware, CLI) and passed into service
/// methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's ID.
    pub user_id: Uuid,
    /// The acting user's name, for logs.
    pub username: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            request_time: Utc::now(),
        }
    }

    /// Context for maintenance work not tied to a user.
    pub fn system() -> Self {
        Self::new(Uuid::nil(), "system")
    }
}
