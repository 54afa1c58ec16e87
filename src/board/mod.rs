//! Panel grid and module model.

/// Slot grid with collision-checked placement.
pub mod grid;
pub mod types;

// Re-export the main types for convenience
pub use grid::{PanelGrid, sync_assignments};
pub use types::{
    BreakerRating, Circuit, Module, ModuleId, ModuleKind, PlacementError, ROW_PITCH, TripCurve,
};
