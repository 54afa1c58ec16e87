//! Shared test fixtures for integration tests.

use panelboard::board::{BreakerRating, Circuit, ModuleId, ModuleKind, PanelGrid, TripCurve};
use panelboard::grouping::{GroupingConfig, GroupingEngine, WeightEstimator};

/// Standard B16 breaker rating.
pub fn b16() -> BreakerRating {
    BreakerRating::new(TripCurve::B, 16)
}

/// Breaker module kind with a B16 rating.
pub fn breaker_kind() -> ModuleKind {
    ModuleKind::Breaker(b16())
}

/// Engine with the built-in estimator and default limits (6 per RCD,
/// 2 capped per RCD).
pub fn default_engine() -> GroupingEngine {
    GroupingEngine::new(WeightEstimator::default(), GroupingConfig::default())
}

/// 2x12 board with two RCDs on separate rows and one linked breaker per
/// circuit name, placed left to right on the top row.
///
/// Circuit ids are `O1`, `O2`, ... in argument order; every circuit is
/// assigned. Returns the grid, the circuits, and the breaker ids.
pub fn board_with_circuits(names: &[&str]) -> (PanelGrid, Vec<Circuit>, Vec<ModuleId>) {
    let mut grid = PanelGrid::new(2, 12);
    grid.place(0, 0, 2, ModuleKind::Rcd, "RCD A", None)
        .unwrap_or_else(|e| panic!("RCD A placement: {e}"));
    grid.place(1, 0, 2, ModuleKind::Rcd, "RCD B", None)
        .unwrap_or_else(|e| panic!("RCD B placement: {e}"));

    let mut circuits = Vec::new();
    let mut breakers = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let id = format!("O{}", i + 1);
        let mut circuit = Circuit::new(id.clone(), *name, b16());
        let module = grid
            .place(0, 2 + i, 1, breaker_kind(), format!("B16 {id}"), Some(id.as_str()))
            .unwrap_or_else(|e| panic!("breaker placement: {e}"));
        circuit.assigned = true;
        circuits.push(circuit);
        breakers.push(module);
    }
    (grid, circuits, breakers)
}
