//! Console rendering of run results for operators.
//!
//! Writers are generic so tests can capture the text.

use std::io::Write;

use crate::error::Result;
use crate::loader::Row;
use crate::model::RecordId;

/// Prints the dry-run preview: one line per row plus the detected metric columns.
pub fn write_preview<W: Write>(out: &mut W, rows: &[Row], metric_columns: &[String]) -> Result<()> {
    writeln!(out, "✅ Dry run completed. Parsed rows:")?;
    for row in rows {
        writeln!(
            out,
            "  - {} / {} -> score {}",
            row.get("airline_iata").unwrap_or_default(),
            row.get("category").unwrap_or_default(),
            row.get("leaderboard_score").unwrap_or("(none)"),
        )?;
    }
    writeln!(out, "Detected metric columns: {metric_columns:?}")?;
    Ok(())
}

/// Prints the confirmation after a snapshot has been activated.
pub fn write_success<W: Write>(
    out: &mut W,
    label: &str,
    snapshot_id: &RecordId,
    travel_class: &str,
) -> Result<()> {
    writeln!(out, "✅ Leaderboard ingestion completed successfully.")?;
    writeln!(
        out,
        "Snapshot '{label}' ({snapshot_id}) activated for travel class {travel_class}."
    )?;
    Ok(())
}
