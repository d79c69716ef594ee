//! Show command implementation.
//!
//! Prints one report definition: its filter, sort order and columns.

use taskreport_core::ReportCatalog;

use super::{CommandContext, Result};
use crate::output::{format_report_details_json, format_report_details_table};

/// Executes the show command.
///
/// # Errors
///
/// Returns `UnknownReport` (with a suggestion) if no report has this name.
pub fn execute(ctx: &CommandContext, catalog: &ReportCatalog, name: &str) -> Result<()> {
    let report = catalog.get(name)?;

    if ctx.json_output {
        println!("{}", format_report_details_json(report)?);
    } else if !ctx.quiet {
        print!(
            "{}",
            format_report_details_table(report, catalog.date_format(), ctx.use_colors)
        );
    }

    Ok(())
}
