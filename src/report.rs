//! Post-hoc board and grouping summary for terminal output.

use std::fmt;

use crate::board::{Circuit, ModuleId, PanelGrid};
use crate::grouping::{GroupingResult, PhaseAssignment};

/// Human-readable summary of a board and its grouping run.
///
/// Built post-hoc from the grid, the grouping result, and the phase
/// assignment, so the printed numbers always agree with the data they
/// describe.
#[derive(Debug, Clone)]
pub struct BoardReport {
    /// Number of rail rows.
    pub rows: usize,
    /// Slots per row.
    pub cols: usize,
    /// Slots occupied by placed modules.
    pub slots_used: usize,
    /// RCD modules on the board.
    pub rcd_count: usize,
    /// Breaker modules on the board.
    pub breaker_count: usize,
    /// One rendered line per RCD group.
    pub group_lines: Vec<String>,
    /// Advisory RCD count when the board has none.
    pub suggested_rcds: Option<usize>,
    /// Labels of breakers no RCD could accept.
    pub unassigned: Vec<String>,
    /// Circuits with no breaker on the board.
    pub unassigned_circuits: usize,
    /// Accumulated weight per phase, indexed L1/L2/L3.
    pub phase_loads: [u32; 3],
}

impl BoardReport {
    /// Builds the report from one complete analysis run.
    pub fn build(
        grid: &PanelGrid,
        circuits: &[Circuit],
        result: &GroupingResult,
        phases: &PhaseAssignment,
    ) -> Self {
        let label_of = |id: ModuleId| -> String {
            match grid.module(id) {
                Some(m) if !m.label.is_empty() => m.label.clone(),
                Some(m) => m.kind.code(),
                None => id.to_string(),
            }
        };

        let group_lines = result
            .groups
            .iter()
            .map(|g| {
                let phase = phases
                    .phase_of(g.rcd)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let members = if g.breakers.is_empty() {
                    "-".to_string()
                } else {
                    g.breakers
                        .iter()
                        .map(|id| label_of(*id))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                let mut flags = Vec::new();
                if g.exclusive {
                    flags.push("dedicated");
                }
                if g.over_capacity {
                    flags.push("over capacity");
                }
                let flags = if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                };
                format!(
                    "{}: {} circuit(s), weight {}, phase {}{} -> {}",
                    label_of(g.rcd),
                    g.breakers.len(),
                    g.total_weight,
                    phase,
                    flags,
                    members
                )
            })
            .collect();

        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            slots_used: grid.slots_used(),
            rcd_count: grid
                .modules()
                .iter()
                .filter(|m| m.kind == crate::board::ModuleKind::Rcd)
                .count(),
            breaker_count: grid.modules().iter().filter(|m| m.kind.is_breaker()).count(),
            group_lines,
            suggested_rcds: result.suggested_rcds,
            unassigned: result.unassigned.iter().map(|id| label_of(*id)).collect(),
            unassigned_circuits: circuits.iter().filter(|c| !c.assigned).count(),
            phase_loads: phases.loads,
        }
    }
}

impl fmt::Display for BoardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Panel Report ---")?;
        writeln!(
            f,
            "Panel:            {} x {} slots ({}/{} used)",
            self.rows,
            self.cols,
            self.slots_used,
            self.rows * self.cols
        )?;
        writeln!(
            f,
            "Devices:          {} RCD | {} MCB",
            self.rcd_count, self.breaker_count
        )?;
        for line in &self.group_lines {
            writeln!(f, "  {line}")?;
        }
        if let Some(needed) = self.suggested_rcds {
            writeln!(
                f,
                "No RCD on the board; suggested: {needed} (one per group of breakers)"
            )?;
        }
        if !self.unassigned.is_empty() {
            writeln!(f, "Unassigned breakers: {}", self.unassigned.join(", "))?;
        }
        if self.unassigned_circuits > 0 {
            writeln!(
                f,
                "Circuits without a breaker: {}",
                self.unassigned_circuits
            )?;
        }
        write!(
            f,
            "Phase loads:      L1={} L2={} L3={}",
            self.phase_loads[0], self.phase_loads[1], self.phase_loads[2]
        )
    }
}
