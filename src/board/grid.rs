//! Slot grid with collision-checked module placement.

use super::types::{Circuit, Module, ModuleId, ModuleKind, PlacementError};

/// Fixed-size grid of unit slots owning all placed modules.
///
/// Every placement mutation goes through the checked operations here, so
/// the same-row non-overlap invariant holds between any two calls. A failed
/// operation never changes grid state.
#[derive(Debug, Clone)]
pub struct PanelGrid {
    rows: usize,
    cols: usize,
    modules: Vec<Module>,
    next_id: u32,
}

impl PanelGrid {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if `rows` or `cols` is zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0, "rows must be > 0");
        assert!(cols > 0, "cols must be > 0");
        Self {
            rows,
            cols,
            modules: Vec::new(),
            next_id: 0,
        }
    }

    /// Number of rail rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of slots per row.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Placed modules, in placement order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Looks up a module by id.
    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Total slots occupied by placed modules.
    pub fn slots_used(&self) -> usize {
        self.modules.iter().map(|m| m.width).sum()
    }

    /// Places a module spanning `[col, col + width)` in `row`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::OutOfBounds`] when the range does not fit
    /// the grid, and [`PlacementError::Collision`] when it overlaps another
    /// module in the same row.
    pub fn place(
        &mut self,
        row: usize,
        col: usize,
        width: usize,
        kind: ModuleKind,
        label: impl Into<String>,
        circuit: Option<&str>,
    ) -> Result<ModuleId, PlacementError> {
        if width == 0 || row >= self.rows || col + width > self.cols {
            return Err(PlacementError::OutOfBounds { row, col, width });
        }
        if self.overlaps(row, col, width, None) {
            return Err(PlacementError::Collision { row, col, width });
        }
        let id = ModuleId(self.next_id);
        self.next_id += 1;
        self.modules.push(Module {
            id,
            row,
            col,
            width,
            kind,
            label: label.into(),
            circuit: circuit.map(str::to_string),
        });
        Ok(id)
    }

    /// Changes a module's width and returns the width actually applied.
    ///
    /// A width that would run past the last column is truncated to the
    /// columns left in the row instead of failing, mirroring the
    /// clamp-to-fit policy of the editing dialogs. Collisions with other
    /// modules are still rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::UnknownModule`] for an id that names no
    /// module, or [`PlacementError::Collision`] when the clamped range
    /// overlaps another module.
    pub fn resize(&mut self, id: ModuleId, new_width: usize) -> Result<usize, PlacementError> {
        let (row, col) = match self.module(id) {
            Some(m) => (m.row, m.col),
            None => return Err(PlacementError::UnknownModule(id)),
        };
        let width = new_width.max(1).min(self.cols - col);
        if self.overlaps(row, col, width, Some(id)) {
            return Err(PlacementError::Collision { row, col, width });
        }
        if let Some(m) = self.modules.iter_mut().find(|m| m.id == id) {
            m.width = width;
        }
        Ok(width)
    }

    /// Moves a module to a new position, truncating its width to fit.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::UnknownModule`] for an unknown id,
    /// [`PlacementError::OutOfBounds`] when the target cell is outside the
    /// grid, or [`PlacementError::Collision`] when the clamped range
    /// overlaps another module.
    pub fn move_to(
        &mut self,
        id: ModuleId,
        new_row: usize,
        new_col: usize,
    ) -> Result<(), PlacementError> {
        let width = match self.module(id) {
            Some(m) => m.width,
            None => return Err(PlacementError::UnknownModule(id)),
        };
        if new_row >= self.rows || new_col >= self.cols {
            return Err(PlacementError::OutOfBounds {
                row: new_row,
                col: new_col,
                width,
            });
        }
        let width = width.min(self.cols - new_col);
        if self.overlaps(new_row, new_col, width, Some(id)) {
            return Err(PlacementError::Collision {
                row: new_row,
                col: new_col,
                width,
            });
        }
        if let Some(m) = self.modules.iter_mut().find(|m| m.id == id) {
            m.row = new_row;
            m.col = new_col;
            m.width = width;
        }
        Ok(())
    }

    /// Removes a module and returns it, or `None` for an unknown id.
    ///
    /// Callers should re-run [`sync_assignments`] afterwards so circuit
    /// `assigned` flags reflect the remaining references.
    pub fn remove(&mut self, id: ModuleId) -> Option<Module> {
        let idx = self.modules.iter().position(|m| m.id == id)?;
        Some(self.modules.remove(idx))
    }

    /// First `(row, col)` whose `width`-wide run is collision free.
    ///
    /// Scans rows top to bottom and columns left to right, so the result
    /// is deterministic: lowest row first, then lowest column.
    pub fn find_first_free_run(&self, width: usize) -> Option<(usize, usize)> {
        if width == 0 || width > self.cols {
            return None;
        }
        for row in 0..self.rows {
            for col in 0..=self.cols - width {
                if !self.overlaps(row, col, width, None) {
                    return Some((row, col));
                }
            }
        }
        None
    }

    /// Replaces the grid dimensions, discarding every placed module.
    ///
    /// Placement is not preserved across a dimension change. Returns the
    /// number of modules discarded so the caller can warn the user instead
    /// of losing the layout silently.
    ///
    /// # Panics
    ///
    /// Panics if `rows` or `cols` is zero.
    pub fn reconfigure(&mut self, rows: usize, cols: usize) -> usize {
        assert!(rows > 0, "rows must be > 0");
        assert!(cols > 0, "cols must be > 0");
        let cleared = self.modules.len();
        self.rows = rows;
        self.cols = cols;
        self.modules.clear();
        cleared
    }

    /// Places a one-slot breaker for every circuit that has none yet.
    ///
    /// Each new module is labelled `"<rating> <circuit-id>"` and linked to
    /// its circuit. Stops when no free slot remains; circuits placed so far
    /// keep their modules. Returns the ids of the new modules.
    pub fn auto_place_unassigned(&mut self, circuits: &mut [Circuit]) -> Vec<ModuleId> {
        let mut placed = Vec::new();
        for circuit in circuits.iter_mut().filter(|c| !c.assigned) {
            let Some((row, col)) = self.find_first_free_run(1) else {
                break;
            };
            let label = format!("{} {}", circuit.breaker, circuit.id);
            let id = match self.place(
                row,
                col,
                1,
                ModuleKind::Breaker(circuit.breaker),
                label,
                Some(circuit.id.as_str()),
            ) {
                Ok(id) => id,
                Err(_) => break,
            };
            circuit.assigned = true;
            placed.push(id);
        }
        placed
    }

    fn overlaps(&self, row: usize, col: usize, width: usize, ignore: Option<ModuleId>) -> bool {
        self.modules.iter().any(|m| {
            if Some(m.id) == ignore || m.row != row {
                return false;
            }
            !(col + width <= m.col || m.col + m.width <= col)
        })
    }
}

/// Recomputes every circuit's `assigned` flag from current grid state.
///
/// A circuit is assigned exactly when at least one placed module references
/// it; flags are recomputed wholesale rather than patched per operation.
pub fn sync_assignments(circuits: &mut [Circuit], grid: &PanelGrid) {
    for circuit in circuits.iter_mut() {
        circuit.assigned = grid
            .modules()
            .iter()
            .any(|m| m.circuit.as_deref() == Some(circuit.id.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::{BreakerRating, TripCurve};

    fn b16() -> ModuleKind {
        ModuleKind::Breaker(BreakerRating::new(TripCurve::B, 16))
    }

    /// Same-row slot ranges must never overlap.
    fn assert_no_overlaps(grid: &PanelGrid) {
        let modules = grid.modules();
        for (i, a) in modules.iter().enumerate() {
            for b in &modules[i + 1..] {
                if a.row != b.row {
                    continue;
                }
                assert!(
                    a.col + a.width <= b.col || b.col + b.width <= a.col,
                    "modules {} and {} overlap",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn place_within_bounds_succeeds() {
        let mut grid = PanelGrid::new(2, 12);
        let id = grid.place(0, 0, 2, ModuleKind::Rcd, "RCD 30mA", None);
        assert!(id.is_ok());
        assert_eq!(grid.modules().len(), 1);
        assert_eq!(grid.slots_used(), 2);
    }

    #[test]
    fn place_out_of_bounds_is_rejected() {
        let mut grid = PanelGrid::new(2, 12);
        let err = grid.place(0, 11, 2, b16(), "B16", None);
        assert_eq!(
            err,
            Err(PlacementError::OutOfBounds {
                row: 0,
                col: 11,
                width: 2
            })
        );
        let err = grid.place(2, 0, 1, b16(), "B16", None);
        assert!(matches!(err, Err(PlacementError::OutOfBounds { .. })));
        let err = grid.place(0, 0, 0, b16(), "B16", None);
        assert!(matches!(err, Err(PlacementError::OutOfBounds { .. })));
    }

    #[test]
    fn colliding_place_does_not_mutate_state() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 2, 3, ModuleKind::Auxiliary, "PSU", None).ok();
        let before = grid.modules().to_vec();

        let err = grid.place(0, 4, 2, b16(), "B16", None);
        assert_eq!(
            err,
            Err(PlacementError::Collision {
                row: 0,
                col: 4,
                width: 2
            })
        );
        assert_eq!(grid.modules(), before.as_slice());
    }

    #[test]
    fn same_range_on_other_row_is_free() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD", None).ok();
        assert!(grid.place(1, 0, 2, ModuleKind::Rcd, "RCD", None).is_ok());
        assert_no_overlaps(&grid);
    }

    #[test]
    fn placement_sequence_preserves_invariant() {
        let mut grid = PanelGrid::new(3, 18);
        let attempts = [
            (0, 0, 2),
            (0, 1, 1), // collides
            (0, 2, 2),
            (1, 0, 4),
            (1, 3, 2), // collides
            (2, 16, 2),
            (2, 17, 2), // out of bounds
            (0, 4, 1),
        ];
        for (row, col, width) in attempts {
            let _ = grid.place(row, col, width, b16(), "B16", None);
            assert_no_overlaps(&grid);
        }
        assert_eq!(grid.modules().len(), 5);
    }

    #[test]
    fn resize_clamps_to_row_end() {
        let mut grid = PanelGrid::new(1, 12);
        let id = grid.place(0, 10, 1, ModuleKind::Auxiliary, "PLC", None);
        let id = id.unwrap_or(ModuleId(u32::MAX));
        assert_eq!(grid.resize(id, 6), Ok(2));
        assert_eq!(grid.module(id).map(|m| m.width), Some(2));
    }

    #[test]
    fn resize_ignores_self_but_rejects_neighbors() {
        let mut grid = PanelGrid::new(1, 12);
        let a = grid.place(0, 0, 2, ModuleKind::Rcd, "RCD", None);
        grid.place(0, 4, 1, b16(), "B16", None).ok();
        let a = a.unwrap_or(ModuleId(u32::MAX));

        // Shrinking and re-growing over its own slots is fine.
        assert_eq!(grid.resize(a, 3), Ok(3));
        // Growing onto the neighbor is not.
        assert!(matches!(
            grid.resize(a, 6),
            Err(PlacementError::Collision { .. })
        ));
        assert_eq!(grid.module(a).map(|m| m.width), Some(3));
    }

    #[test]
    fn move_to_truncates_width_at_row_end() {
        let mut grid = PanelGrid::new(2, 12);
        let id = grid.place(0, 0, 3, ModuleKind::Auxiliary, "PSU", None);
        let id = id.unwrap_or(ModuleId(u32::MAX));
        assert_eq!(grid.move_to(id, 1, 10), Ok(()));
        let moved = grid.module(id);
        assert_eq!(moved.map(|m| (m.row, m.col, m.width)), Some((1, 10, 2)));
    }

    #[test]
    fn move_to_unknown_module_fails() {
        let mut grid = PanelGrid::new(2, 12);
        assert_eq!(
            grid.move_to(ModuleId(9), 0, 0),
            Err(PlacementError::UnknownModule(ModuleId(9)))
        );
    }

    #[test]
    fn remove_frees_slots() {
        let mut grid = PanelGrid::new(2, 12);
        let id = grid.place(0, 0, 2, ModuleKind::Rcd, "RCD", None);
        let id = id.unwrap_or(ModuleId(u32::MAX));
        assert!(grid.remove(id).is_some());
        assert!(grid.place(0, 0, 2, ModuleKind::Rcd, "RCD", None).is_ok());
        assert!(grid.remove(ModuleId(99)).is_none());
    }

    #[test]
    fn first_free_run_on_empty_grid_is_origin() {
        let grid = PanelGrid::new(2, 12);
        assert_eq!(grid.find_first_free_run(1), Some((0, 0)));
    }

    #[test]
    fn first_free_run_skips_occupied_slots() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD", None).ok();
        assert_eq!(grid.find_first_free_run(1), Some((0, 2)));
        assert_eq!(grid.find_first_free_run(2), Some((0, 2)));
    }

    #[test]
    fn first_free_run_falls_through_to_next_row() {
        let mut grid = PanelGrid::new(2, 4);
        grid.place(0, 0, 3, ModuleKind::Auxiliary, "PSU", None).ok();
        // One slot left in row 0, so a width-2 run starts on row 1.
        assert_eq!(grid.find_first_free_run(2), Some((1, 0)));
        assert_eq!(grid.find_first_free_run(1), Some((0, 3)));
    }

    #[test]
    fn first_free_run_on_full_grid_is_none() {
        let mut grid = PanelGrid::new(1, 4);
        grid.place(0, 0, 4, ModuleKind::Auxiliary, "PLC", None).ok();
        assert_eq!(grid.find_first_free_run(1), None);
        assert_eq!(grid.find_first_free_run(0), None);
        assert_eq!(grid.find_first_free_run(5), None);
    }

    #[test]
    fn reconfigure_clears_modules_and_reports_count() {
        let mut grid = PanelGrid::new(2, 12);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD", None).ok();
        grid.place(1, 0, 1, b16(), "B16", None).ok();
        assert_eq!(grid.reconfigure(3, 18), 2);
        assert_eq!((grid.rows(), grid.cols()), (3, 18));
        assert!(grid.modules().is_empty());
    }

    #[test]
    fn auto_place_pins_unassigned_circuits() {
        let mut grid = PanelGrid::new(1, 4);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD", None).ok();
        let rating = BreakerRating::new(TripCurve::B, 16);
        let mut circuits = vec![
            Circuit::new("O1", "Sockets", rating),
            Circuit::new("O2", "Lighting", BreakerRating::new(TripCurve::B, 10)),
            Circuit::new("O3", "Garage", rating),
        ];
        circuits[0].assigned = true;

        let placed = grid.auto_place_unassigned(&mut circuits);
        // Two free slots: O2 and O3 fit, O1 was already assigned.
        assert_eq!(placed.len(), 2);
        assert!(circuits.iter().all(|c| c.assigned));
        let labels: Vec<&str> = grid.modules().iter().map(|m| m.label.as_str()).collect();
        assert!(labels.contains(&"B10 O2"));
        assert!(labels.contains(&"B16 O3"));
    }

    #[test]
    fn auto_place_stops_when_panel_is_full() {
        let mut grid = PanelGrid::new(1, 2);
        grid.place(0, 0, 2, ModuleKind::Rcd, "RCD", None).ok();
        let rating = BreakerRating::new(TripCurve::B, 16);
        let mut circuits = vec![Circuit::new("O1", "Sockets", rating)];
        assert!(grid.auto_place_unassigned(&mut circuits).is_empty());
        assert!(!circuits[0].assigned);
    }

    #[test]
    fn sync_assignments_recomputes_flags() {
        let mut grid = PanelGrid::new(2, 12);
        let id = grid.place(0, 0, 1, b16(), "B16 O1", Some("O1"));
        let rating = BreakerRating::new(TripCurve::B, 16);
        let mut circuits = vec![
            Circuit::new("O1", "Sockets", rating),
            Circuit::new("O2", "Lighting", rating),
        ];

        sync_assignments(&mut circuits, &grid);
        assert!(circuits[0].assigned);
        assert!(!circuits[1].assigned);

        if let Ok(id) = id {
            grid.remove(id);
        }
        sync_assignments(&mut circuits, &grid);
        assert!(!circuits[0].assigned);
    }
}
