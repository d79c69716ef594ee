//! Reports command implementation.
//!
//! Lists every report defined by the preset and taskrc.

use taskreport_core::ReportCatalog;

use super::{CommandContext, Result};
use crate::output::{format_reports_json, format_reports_table};

/// Executes the reports command.
pub fn execute(ctx: &CommandContext, catalog: &ReportCatalog) -> Result<()> {
    let reports: Vec<_> = catalog.iter().collect();

    if ctx.json_output {
        println!("{}", format_reports_json(&reports)?);
    } else if !ctx.quiet {
        print!("{}", format_reports_table(&reports, ctx.use_colors));
    }

    Ok(())
}
