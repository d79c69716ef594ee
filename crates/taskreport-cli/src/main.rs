use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::load_config;
use commands::report::ReportOptions;
use commands::{CommandContext, CommandError};
use taskreport_core::Error as ReportError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                eprintln!("{error_json:#}");
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` refines the level;
/// `--verbose` raises the default to debug.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    // Completions need no configuration at all
    if let Some(Commands::Completions { shell }) = &cli.command {
        return Ok(commands::completions::execute(shell)?);
    }

    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli, &config);

    match &cli.command {
        Some(Commands::Config { command }) => match command {
            Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
            Some(ConfigCommands::Show) | None => commands::config::execute_show(&ctx, &config),
        },
        Some(Commands::Reports) => {
            let catalog = commands::load_catalog(cli, &config)?;
            commands::reports::execute(&ctx, &catalog)
        }
        Some(Commands::Show { name }) => {
            let catalog = commands::load_catalog(cli, &config)?;
            commands::show::execute(&ctx, &catalog, name)
        }
        Some(Commands::Udas) => {
            let catalog = commands::load_catalog(cli, &config)?;
            commands::udas::execute(&ctx, &catalog)
        }
        Some(Commands::Report {
            name,
            filter,
            data,
            now,
        }) => {
            let catalog = commands::load_catalog(cli, &config)?;
            let opts = ReportOptions {
                name: name.clone(),
                filter: filter.clone(),
                data: data.clone(),
                now: now.clone(),
            };
            commands::report::execute(&ctx, &catalog, &config, &opts)
        }
        None => {
            let catalog = commands::load_catalog(cli, &config)?;
            commands::report::execute(&ctx, &catalog, &config, &ReportOptions::default())
        }
        Some(Commands::Completions { .. }) => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Report(inner) => match inner {
            ReportError::InvalidReport { .. } => "REPORT_ERROR",
            ReportError::InvalidTask { .. } | ReportError::Json(_) => "DATA_ERROR",
            ReportError::UnknownReport { .. } => "UNKNOWN_REPORT",
            ReportError::Config { .. } => "CONFIG_ERROR",
            ReportError::Io(_) => "IO_ERROR",
            _ => "FILTER_ERROR",
        },
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::InvalidInput(_) => "INVALID_INPUT",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the process exit status for an error.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Report(ReportError::InvalidReport { .. }) => 1,
        CommandError::Report(inner) => match inner.root() {
            ReportError::Io(_) => 3,
            ReportError::Config { .. } => 5,
            _ => 1,
        },
        CommandError::Config(_) => 5,
        CommandError::InvalidInput(_) => 1,
        CommandError::Io(_) => 3,
        CommandError::Json(_) => 1,
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_error(text: &str) -> CommandError {
        let catalog = taskreport_core::ReportCatalog::load(&taskreport_core::presets::taskrc(
            taskreport_core::PresetVersion::Current,
        ))
        .unwrap();
        CommandError::Report(catalog.parse_filter(text).unwrap_err())
    }

    #[test]
    fn test_filter_error_code() {
        let err = report_error("bogus:1");
        assert_eq!(error_code(&err), "FILTER_ERROR");
        assert_eq!(exit_status(&err), 1);
    }

    #[test]
    fn test_invalid_report_code() {
        let rc = taskreport_core::Taskrc::parse("report.x.columns=uuid\nreport.x.labels=A,B\n")
            .unwrap();
        let err = CommandError::Report(taskreport_core::ReportCatalog::load(&rc).unwrap_err());
        assert_eq!(error_code(&err), "REPORT_ERROR");
        assert_eq!(exit_status(&err), 1);
    }

    #[test]
    fn test_io_error_code() {
        let err = CommandError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(error_code(&err), "IO_ERROR");
        assert_eq!(exit_status(&err), 3);

        let err = CommandError::Report(ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        )));
        assert_eq!(exit_status(&err), 3);
    }

    #[test]
    fn test_config_error_code() {
        let err = CommandError::Config("bad".to_string());
        assert_eq!(error_code(&err), "CONFIG_ERROR");
        assert_eq!(exit_status(&err), 5);

        let err = CommandError::Report(ReportError::config(3, "expected key=value"));
        assert_eq!(error_code(&err), "CONFIG_ERROR");
        assert_eq!(exit_status(&err), 5);
    }

    #[test]
    fn test_data_error_code() {
        let schema = taskreport_core::AttributeSchema::builtin();
        let err = CommandError::Report(
            taskreport_core::load_tasks(&schema, r#"[{"status": "finished"}]"#).unwrap_err(),
        );
        assert_eq!(error_code(&err), "DATA_ERROR");
        assert_eq!(exit_status(&err), 1);
    }
}
