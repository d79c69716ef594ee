//! Config command implementation.
//!
//! Settings live in `~/.config/trep/config.toml`. They name the taskrc file,
//! the task data file, the preset generation and output preferences; CLI
//! flags override each of them.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    #[serde(default = "default_version")]
    pub version: u32,

    /// taskrc file loaded on top of the preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taskrc: Option<PathBuf>,

    /// Task export JSON used when `--data` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,

    /// Preset generation: "current", "legacy" or "none".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Report run when `trep report` gets no name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_report: Option<String>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            taskrc: None,
            data: None,
            preset: None,
            default_report: None,
            output: OutputConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// Width of `truncated` description columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate_width: Option<usize>,
}

/// Gets the config file path.
///
/// `TREP_CONFIG` names the file directly; otherwise `XDG_CONFIG_HOME/trep`
/// or `~/.config/trep` holds `config.toml`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("TREP_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let dir = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config).join("trep"),
        _ => BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".config").join("trep"))
            .ok_or_else(|| {
                CommandError::Config("Could not determine config directory".to_string())
            })?,
    };
    Ok(dir.join("config.toml"))
}

/// Loads the configuration from disk, or defaults when there is no file.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {e}")))?;

    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), version = config.version, "loaded config");
    Ok(config)
}

fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {e}")))?;
    migrate_config(config)
}

/// Migrates config to the current version.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "config version {} is newer than supported version {CONFIG_VERSION}",
            config.version
        )));
    }

    // Version 1 is the first schema; later migrations go here.
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext, config: &Config) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if ctx.quiet {
        return Ok(());
    }

    use owo_colors::OwoColorize;

    let header = "Configuration";
    if ctx.use_colors {
        println!("{}\n", header.green().bold());
    } else {
        println!("{header}\n");
    }

    println!("File: {}", path.display());
    println!("Exists: {}\n", path.exists());

    let unset = || "(unset)".to_string();
    let show_path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());

    println!("Settings:");
    println!("  taskrc: {}", show_path(&config.taskrc).unwrap_or_else(unset));
    println!("  data: {}", show_path(&config.data).unwrap_or_else(unset));
    println!(
        "  preset: {}",
        config.preset.clone().unwrap_or_else(|| "current".to_string())
    );
    println!(
        "  default_report: {}",
        config.default_report.clone().unwrap_or_else(unset)
    );

    println!("\n[output]");
    if let Some(color) = config.output.color {
        println!("  color: {color}");
    }
    if let Some(width) = config.output.truncate_width {
        println!("  truncate_width: {width}");
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}
