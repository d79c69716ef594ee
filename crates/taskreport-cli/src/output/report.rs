//! Report run output formatting.

use taskreport_core::{ReportLine, ReportOutput};

use super::helpers::{column_widths, count_noun, dim, format_header, format_row};

/// Formats a report run as JSON.
pub fn format_report_json(output: &ReportOutput) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(output)
}

/// Formats a report run as a table.
///
/// Sort-group breaks become blank lines; a count of matching tasks follows
/// the rows.
pub fn format_report_table(output: &ReportOutput, use_colors: bool) -> String {
    if output.lines.is_empty() {
        return "No matches.\n".to_string();
    }

    let rows = output
        .lines
        .iter()
        .filter_map(ReportLine::as_row)
        .map(|row| row.cells.as_slice());
    let widths = column_widths(&output.labels, rows);

    let mut out = format_header(&output.labels, &widths, use_colors);
    for line in &output.lines {
        match line {
            ReportLine::Row(row) => out.push_str(&format_row(&row.cells, &widths)),
            ReportLine::Break => out.push('\n'),
        }
    }

    out.push('\n');
    out.push_str(&dim(&count_noun(output.matched, "task"), use_colors));
    out.push('\n');
    out
}
