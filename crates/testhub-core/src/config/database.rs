//! PostgreSQL settings for the folder store.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How TestHub connects to the database holding `folders` and `test_cases`.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[validate(length(min = 1))]
    pub url: String,
    /// Pool size. A cascade or batch move holds one connection at a time.
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1, max = 200))]
    pub max_connections: u32,
    /// Seconds to wait for a free pooled connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    /// Reported in `pg_stat_activity` so DBAs can tell TestHub sessions apart.
    #[serde(default = "default_application_name")]
    #[validate(length(min = 1, max = 63))]
    pub application_name: String,
    /// Server-side `statement_timeout` in seconds; 0 disables it.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Value for the `statement_timeout` session setting.
    pub fn statement_timeout(&self) -> String {
        match self.statement_timeout_seconds {
            0 => "0".to_string(),
            secs => format!("{secs}s"),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_application_name() -> String {
    "testhub".to_string()
}

fn default_statement_timeout() -> u64 {
    30
}
