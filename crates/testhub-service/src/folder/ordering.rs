//! Sparse sibling positions.
//!
//! Siblings are ordered by an integer `order_index` with gaps between
//! neighbours, so that a folder can usually be slotted between two others
//! without touching them.

use testhub_core::config::FolderConfig;

/// Computes order indices between two neighbouring siblings.
#[derive(Debug, Clone, Copy)]
pub struct OrderIndexAllocator {
    step: i64,
    baseline: i64,
}

impl OrderIndexAllocator {
    /// Creates an allocator with an explicit step and baseline.
    pub fn new(step: i64, baseline: i64) -> Self {
        Self { step, baseline }
    }

    /// Creates an allocator from the folder configuration.
    pub fn from_config(config: &FolderConfig) -> Self {
        Self::new(config.order_step, config.order_baseline)
    }

    /// Computes an index between `prev` and `next`.
    ///
    /// * neither neighbour: the baseline
    /// * only `next`: one step before it
    /// * only `prev`: one step after it
    /// * both: the floored midpoint
    ///
    /// When the two neighbours are adjacent integers the midpoint equals
    /// `prev`, and near the ends of the `i64` range the step saturates, so
    /// the result can collide. Check [`has_room`](Self::has_room) first and
    /// renumber with [`spread`](Self::spread) when it is false.
    pub fn allocate(&self, prev: Option<i64>, next: Option<i64>) -> i64 {
        match (prev, next) {
            (None, None) => self.baseline,
            (None, Some(next)) => next.saturating_sub(self.step),
            (Some(prev), None) => prev.saturating_add(self.step),
            (Some(prev), Some(next)) => midpoint(prev, next),
        }
    }

    /// Whether [`allocate`](Self::allocate) yields a fresh index strictly
    /// between `prev` and `next`.
    pub fn has_room(&self, prev: Option<i64>, next: Option<i64>) -> bool {
        match (prev, next) {
            (None, None) => true,
            (None, Some(next)) => next.checked_sub(self.step).is_some(),
            (Some(prev), None) => prev.checked_add(self.step).is_some(),
            (Some(prev), Some(next)) => i128::from(next) - i128::from(prev) > 1,
        }
    }

    /// Whether a client-chosen index leaves a full step on both sides.
    ///
    /// Indices at the edges of the `i64` range are refused so that later
    /// head or tail inserts never run out of room.
    pub fn is_usable(&self, index: i64) -> bool {
        index.checked_add(self.step).is_some() && index.checked_sub(self.step).is_some()
    }

    /// Evenly spaced indices for `count` siblings, starting at the baseline.
    pub fn spread(&self, count: usize) -> Vec<i64> {
        (0..count as i64)
            .map(|i| self.baseline + i * self.step)
            .collect()
    }
}

/// Floored midpoint without intermediate overflow.
fn midpoint(a: i64, b: i64) -> i64 {
    // Always within [a, b], so the narrowing cannot truncate.
    (i128::from(a) + i128::from(b)).div_euclid(2) as i64
}

impl Default for OrderIndexAllocator {
    fn default() -> Self {
        Self::from_config(&FolderConfig::default())
    }
}
