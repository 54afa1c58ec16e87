//! Grouping configuration and result value types.

use crate::board::ModuleId;

/// Limits for the RCD grouping pass.
#[derive(Debug, Clone, Copy)]
pub struct GroupingConfig {
    /// Maximum breakers a single RCD may protect.
    pub max_breakers_per_rcd: usize,
    /// Maximum capped-category (kitchen-like) breakers per RCD.
    pub max_capped_per_rcd: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            max_breakers_per_rcd: 6,
            max_capped_per_rcd: 2,
        }
    }
}

/// Breakers assigned to one RCD, with aggregate bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcdGroup {
    /// The protecting RCD module.
    pub rcd: ModuleId,
    /// Assigned breakers, in assignment order.
    pub breakers: Vec<ModuleId>,
    /// Sum of the estimated weights of the assigned breakers.
    pub total_weight: u32,
    /// Number of capped-category breakers in the group.
    pub capped_count: usize,
    /// The RCD is reserved for a single wet-area breaker.
    pub exclusive: bool,
    /// At least one breaker was seated past the configured limits.
    pub over_capacity: bool,
}

/// Complete outcome of one grouping run.
///
/// A derived view over the grid: recomputed from scratch on every run,
/// never patched incrementally, and sharing no state with the inputs.
/// All grouping-time situations surface here as advisories, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingResult {
    /// One group per RCD, ordered by RCD position (row, then column).
    pub groups: Vec<RcdGroup>,
    /// Advisory RCD count when the board has none.
    pub suggested_rcds: Option<usize>,
    /// Breakers no RCD could accept: exclusivity was unsatisfiable, or
    /// every RCD was already reserved. Never silently dropped.
    pub unassigned: Vec<ModuleId>,
}

impl GroupingResult {
    /// Whether any group was flagged over capacity.
    pub fn has_overflow(&self) -> bool {
        self.groups.iter().any(|g| g.over_capacity)
    }
}
