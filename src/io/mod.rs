//! Input/output helpers for board data.

/// CSV export of the bill of materials and the grouping table.
pub mod export;
