//! Greedy three-phase balancing of RCD group weights.

use std::fmt;

use crate::board::ModuleId;

use super::types::RcdGroup;

/// One of the three supply phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    L1,
    L2,
    L3,
}

impl Phase {
    /// All phases in index order.
    pub const ALL: [Phase; 3] = [Phase::L1, Phase::L2, Phase::L3];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::L1 => write!(f, "L1"),
            Phase::L2 => write!(f, "L2"),
            Phase::L3 => write!(f, "L3"),
        }
    }
}

/// Phase labels per RCD group plus the resulting per-phase loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseAssignment {
    /// `(rcd, phase)` pairs, in the order the groups were given.
    pub assignments: Vec<(ModuleId, Phase)>,
    /// Accumulated weight per phase, indexed L1/L2/L3.
    pub loads: [u32; 3],
}

impl PhaseAssignment {
    /// Phase assigned to the given RCD, if it was balanced.
    pub fn phase_of(&self, rcd: ModuleId) -> Option<Phase> {
        self.assignments
            .iter()
            .find(|(id, _)| *id == rcd)
            .map(|(_, phase)| *phase)
    }
}

/// Longest-processing-time-first balancer over the three phases.
///
/// Heaviest group first, always onto the least-loaded phase, ties to the
/// lowest phase index. The labeling is advisory, so the greedy rule is kept
/// as-is instead of an exact partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseBalancer;

impl PhaseBalancer {
    /// Assigns each group to a phase, balancing total weight.
    pub fn balance(&self, groups: &[RcdGroup]) -> PhaseAssignment {
        let mut order: Vec<usize> = (0..groups.len()).collect();
        // Stable sort: equal weights keep input order.
        order.sort_by(|&a, &b| groups[b].total_weight.cmp(&groups[a].total_weight));

        let mut loads = [0u32; 3];
        let mut phases = vec![Phase::L1; groups.len()];
        for &i in &order {
            let lightest = (0..3).min_by_key(|&p| loads[p]).unwrap_or(0);
            phases[i] = Phase::ALL[lightest];
            loads[lightest] += groups[i].total_weight;
        }

        PhaseAssignment {
            assignments: groups.iter().zip(phases).map(|(g, p)| (g.rcd, p)).collect(),
            loads,
        }
    }
}
