//! Udas command implementation.
//!
//! Lists the attribute schema: built-ins first, then user-defined attributes.

use taskreport_core::ReportCatalog;

use super::{CommandContext, Result};
use crate::output::{format_attributes_json, format_attributes_table};

/// Executes the udas command.
pub fn execute(ctx: &CommandContext, catalog: &ReportCatalog) -> Result<()> {
    let mut attributes: Vec<_> = catalog.schema().iter().collect();
    attributes.sort_by(|a, b| b.builtin.cmp(&a.builtin).then_with(|| a.name.cmp(&b.name)));

    if ctx.json_output {
        println!("{}", format_attributes_json(&attributes)?);
    } else if !ctx.quiet {
        print!("{}", format_attributes_table(&attributes, ctx.use_colors));
    }

    Ok(())
}
