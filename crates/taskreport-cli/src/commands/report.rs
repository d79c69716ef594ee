//! Report command implementation.
//!
//! Runs one report over a task export: the report and any extra filter are
//! validated first, then the task data is read, filtered, sorted and printed.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use taskreport_core::value::parse_date;
use taskreport_core::{load_tasks, Filter, FormatOptions, ReportCatalog, RunOptions};

use super::config::Config;
use super::{CommandContext, CommandError, Result};
use crate::output::{format_report_json, format_report_table};

/// Report run when neither the command line nor the config names one.
const DEFAULT_REPORT: &str = "main";

/// Options for the report command.
#[derive(Debug, Default)]
pub struct ReportOptions {
    /// Report name.
    pub name: Option<String>,
    /// Additional filter expression.
    pub filter: Option<String>,
    /// Task export path, `-` for stdin.
    pub data: Option<PathBuf>,
    /// Reference time for relative dates.
    pub now: Option<String>,
}

/// Executes the report command.
///
/// # Errors
///
/// Returns an error if the report is unknown, the extra filter is invalid,
/// the task data cannot be read or parsed, or `--now` is not a date.
pub fn execute(
    ctx: &CommandContext,
    catalog: &ReportCatalog,
    config: &Config,
    opts: &ReportOptions,
) -> Result<()> {
    let name = opts
        .name
        .as_deref()
        .or(config.default_report.as_deref())
        .unwrap_or(DEFAULT_REPORT);
    let report = catalog.get(name)?;

    let extra_filter = match opts.filter.as_deref() {
        Some(expression) => catalog.parse_filter(expression)?,
        None => Filter::All,
    };
    let now = resolve_now(opts.now.as_deref())?;

    let data = opts.data.as_ref().or(config.data.as_ref());
    let text = read_data(data.map(PathBuf::as_path))?;
    let tasks = load_tasks(catalog.schema(), &text)?;

    tracing::info!(count = tasks.len(), "loaded tasks");

    let mut format = FormatOptions::new(now);
    format.date_format = catalog.date_format().to_string();
    if let Some(width) = config.output.truncate_width {
        format.truncate_width = width;
    }

    let options = RunOptions {
        format,
        extra_filter,
    };
    let output = report.run(&tasks, &options);

    if ctx.json_output {
        println!("{}", format_report_json(&output)?);
    } else if !ctx.quiet {
        print!("{}", format_report_table(&output, ctx.use_colors));
    }

    Ok(())
}

/// Parses `--now`, defaulting to the current time.
fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        None => Ok(Utc::now()),
        Some(text) => parse_date(text)
            .ok_or_else(|| CommandError::InvalidInput(format!("invalid --now date '{text}'"))),
    }
}

/// Reads the task export from a file, or stdin for `-` or no path.
fn read_data(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            tracing::debug!(path = %path.display(), "reading task data");
            Ok(fs::read_to_string(path)?)
        }
        _ => {
            tracing::debug!("reading task data from stdin");
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_now_parses_dates() {
        let now = resolve_now(Some("2024-03-15T12:00")).unwrap();
        assert_eq!(now, Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());

        let now = resolve_now(Some("20240315T120000Z")).unwrap();
        assert_eq!(now, Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_resolve_now_rejects_garbage() {
        assert!(matches!(
            resolve_now(Some("next tuesday")),
            Err(CommandError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_read_data_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");
        fs::write(&path, "[]").unwrap();
        assert_eq!(read_data(Some(&path)).unwrap(), "[]");
    }

    #[test]
    fn test_read_data_missing_file() {
        let err = read_data(Some(Path::new("/nonexistent/export.json"))).unwrap_err();
        assert!(matches!(err, CommandError::Io(_)));
    }
}
