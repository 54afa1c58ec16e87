//! CSV export for the bill of materials and the grouping table.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::board::{ModuleId, PanelGrid};
use crate::grouping::{GroupingResult, PhaseAssignment};

/// Column header for the bill-of-materials CSV.
const BOM_HEADER: &str = "row,col,width,kind,label,circuit";

/// Column header for the grouping CSV.
const GROUPS_HEADER: &str = "rcd,phase,breakers,total_weight,capped_count,exclusive,over_capacity";

/// Exports the bill of materials to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_bom_csv(grid: &PanelGrid, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_bom_csv(grid, io::BufWriter::new(file))
}

/// Writes the bill of materials as CSV to any writer.
///
/// One row per module, sorted by `(row, col)` so output is deterministic
/// regardless of placement order. Row and column are 1-based, matching the
/// numbering printed on the panel front.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_bom_csv(grid: &PanelGrid, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(BOM_HEADER.split(','))?;

    let mut modules: Vec<_> = grid.modules().iter().collect();
    modules.sort_by_key(|m| (m.row, m.col));
    for m in modules {
        wtr.write_record(&[
            (m.row + 1).to_string(),
            (m.col + 1).to_string(),
            m.width.to_string(),
            m.kind.code(),
            m.label.clone(),
            m.circuit.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the grouping table to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_groups_csv(
    grid: &PanelGrid,
    result: &GroupingResult,
    phases: &PhaseAssignment,
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_groups_csv(grid, result, phases, io::BufWriter::new(file))
}

/// Writes the grouping table as CSV to any writer.
///
/// One row per RCD group; member breakers are listed by label, joined with
/// `"; "`.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_groups_csv(
    grid: &PanelGrid,
    result: &GroupingResult,
    phases: &PhaseAssignment,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(GROUPS_HEADER.split(','))?;

    for group in &result.groups {
        let phase = phases
            .phase_of(group.rcd)
            .map(|p| p.to_string())
            .unwrap_or_default();
        let members = group
            .breakers
            .iter()
            .map(|id| module_label(grid, *id))
            .collect::<Vec<_>>()
            .join("; ");
        wtr.write_record(&[
            module_label(grid, group.rcd),
            phase,
            members,
            group.total_weight.to_string(),
            group.capped_count.to_string(),
            group.exclusive.to_string(),
            group.over_capacity.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn module_label(grid: &PanelGrid, id: ModuleId) -> String {
    match grid.module(id) {
        Some(m) if !m.label.is_empty() => m.label.clone(),
        Some(m) => m.kind.code(),
        None => id.to_string(),
    }
}
