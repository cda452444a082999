//! Per-sibling-set serialisation of order allocation.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// `(project_id, parent_id)` of a sibling set.
pub type SiblingKey = (Uuid, Option<Uuid>);

/// Async mutexes keyed by sibling set.
///
/// Reading the neighbours and writing the computed index happen while the
/// set's guard is held, so two writers in the same process cannot pick the
/// same slot.
#[derive(Debug, Clone, Default)]
pub struct SiblingLocks {
    locks: Arc<DashMap<SiblingKey, Arc<Mutex<()>>>>,
}

impl SiblingLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to one sibling set.
    ///
    /// Idle entries of other sets are dropped first, so the table only
    /// holds sets that are locked or contended.
    pub async fn acquire(&self, project_id: Uuid, parent_id: Option<Uuid>) -> OwnedMutexGuard<()> {
        self.prune();
        let lock = self
            .locks
            .entry((project_id, parent_id))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drops entries nobody is holding or waiting on.
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked sibling sets.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no sibling set is tracked.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
