//! Folder hierarchy limits and ordering parameters.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tunables for the folder hierarchy engine.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Deepest allowed folder depth. Roots sit at depth 0.
    #[serde(default = "default_max_depth")]
    #[validate(range(min = 1, max = 64))]
    pub max_depth: i32,
    /// Distance between neighbouring order indices on append and renumber.
    #[serde(default = "default_order_step")]
    #[validate(range(min = 2, max = 1000000))]
    pub order_step: i64,
    /// Order index given to the first folder of an empty sibling set.
    #[serde(default = "default_order_baseline")]
    pub order_baseline: i64,
    /// Upper bound on the number of items in one batch move.
    #[serde(default = "default_max_batch_size")]
    #[validate(range(min = 1, max = 10000))]
    pub max_batch_size: usize,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            order_step: default_order_step(),
            order_baseline: default_order_baseline(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

fn default_max_depth() -> i32 {
    10
}

fn default_order_step() -> i64 {
    100
}

fn default_order_baseline() -> i64 {
    100
}

fn default_max_batch_size() -> usize {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FolderConfig::default();
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.order_baseline, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_degenerate_step() {
        let config = FolderConfig {
            order_step: 1,
            ..FolderConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
