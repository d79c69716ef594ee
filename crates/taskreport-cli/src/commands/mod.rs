//! Command implementations for the trep CLI.
//!
//! This module contains the command handlers invoked from `main`, plus the
//! shared setup that turns CLI flags and the config file into a
//! [`ReportCatalog`].

pub mod completions;
pub mod config;
pub mod report;
pub mod reports;
pub mod show;
pub mod udas;

use std::env;

use taskreport_core::{presets, PresetVersion, ReportCatalog, Taskrc};

use crate::cli::{Cli, PresetArg};
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Report engine error (definitions, filters, task data).
    #[error("{0}")]
    Report(#[from] taskreport_core::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid command-line input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing output settings.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the config file.
    ///
    /// Colors are off when `--no-color` is given, when `NO_COLOR` is set, or
    /// when the config sets `output.color = false`.
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        let no_color_env = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
        }
    }
}

/// Resolves the preset generation from `--preset`, then the config file.
///
/// Returns `None` for `--preset none`.
pub fn resolve_preset(cli: &Cli, config: &Config) -> Result<Option<PresetVersion>> {
    match cli.preset {
        Some(PresetArg::Current) => return Ok(Some(PresetVersion::Current)),
        Some(PresetArg::Legacy) => return Ok(Some(PresetVersion::Legacy)),
        Some(PresetArg::None) => return Ok(None),
        None => {}
    }

    match config.preset.as_deref() {
        None => Ok(Some(PresetVersion::Current)),
        Some("none") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(CommandError::Config),
    }
}

/// Builds the effective taskrc: preset, then the taskrc file, then `--rc` overrides.
pub fn build_taskrc(cli: &Cli, config: &Config) -> Result<Taskrc> {
    let mut taskrc = match resolve_preset(cli, config)? {
        Some(version) => presets::taskrc(version),
        None => Taskrc::new(),
    };

    if let Some(path) = cli.taskrc.as_ref().or(config.taskrc.as_ref()) {
        taskrc.merge(Taskrc::load(path)?);
    }

    for assignment in &cli.rc {
        taskrc.apply_override(assignment)?;
    }

    Ok(taskrc)
}

/// Builds the report catalog, validating every report definition.
pub fn load_catalog(cli: &Cli, config: &Config) -> Result<ReportCatalog> {
    let taskrc = build_taskrc(cli, config)?;
    let catalog = ReportCatalog::load(&taskrc)?;
    tracing::debug!(reports = catalog.len(), "catalog ready");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["trep"];
        full.extend_from_slice(args);
        full.push("reports");
        Cli::parse_from(full)
    }

    #[test]
    fn test_preset_flag_wins_over_config() {
        let config = Config {
            preset: Some("current".to_string()),
            ..Config::default()
        };
        let preset = resolve_preset(&cli(&["--preset", "legacy"]), &config).unwrap();
        assert_eq!(preset, Some(PresetVersion::Legacy));
    }

    #[test]
    fn test_preset_from_config() {
        let config = Config {
            preset: Some("none".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_preset(&cli(&[]), &config).unwrap(), None);

        let config = Config {
            preset: Some("bogus".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            resolve_preset(&cli(&[]), &config),
            Err(CommandError::Config(_))
        ));
    }

    #[test]
    fn test_default_preset_is_current() {
        let preset = resolve_preset(&cli(&[]), &Config::default()).unwrap();
        assert_eq!(preset, Some(PresetVersion::Current));
    }

    #[test]
    fn test_build_taskrc_layers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskrc");
        fs::write(&path, "dateformat=D/M/Y\nreport.main.filter=+next\n").unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let cli = cli(&["--taskrc", &path_arg, "--rc", "dateformat=Y-M-D"]);
        let taskrc = build_taskrc(&cli, &Config::default()).unwrap();

        assert_eq!(taskrc.get("report.main.filter"), Some("+next"));
        assert_eq!(taskrc.date_format(), Some("Y-M-D"));
        // Preset keys survive underneath
        assert!(taskrc.get("report.obj.columns").is_some());
    }

    #[test]
    fn test_build_taskrc_without_preset() {
        let cli = cli(&["--preset", "none", "--rc", "report.x.columns=uuid"]);
        let taskrc = build_taskrc(&cli, &Config::default()).unwrap();
        assert_eq!(taskrc.len(), 1);
    }

    #[test]
    fn test_bad_override() {
        let cli = cli(&["--rc", "nonsense"]);
        assert!(matches!(
            build_taskrc(&cli, &Config::default()),
            Err(CommandError::Report(_))
        ));
    }

    #[test]
    fn test_missing_taskrc_file() {
        let cli = cli(&["--taskrc", "/nonexistent/trep/taskrc"]);
        let err = build_taskrc(&cli, &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Report(taskreport_core::Error::Io(_))
        ));
    }
}
