//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for trep.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// trep - Run taskwarrior-style reports over task exports
#[derive(Parser, Debug)]
#[command(name = "trep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// taskrc file to load on top of the preset
    #[arg(long, global = true, env = "TASKRC")]
    pub taskrc: Option<PathBuf>,

    /// Built-in report set to start from
    #[arg(long, global = true, value_enum)]
    pub preset: Option<PresetArg>,

    /// Override a taskrc key (repeatable), e.g. --rc dateformat=Y-M-D
    #[arg(long = "rc", global = true, value_name = "KEY=VALUE", action = clap::ArgAction::Append)]
    pub rc: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a report
    #[command(alias = "r")]
    Report {
        /// Report name (default: from config, then "main")
        name: Option<String>,

        /// Additional filter ANDed with the report filter
        #[arg(short, long)]
        filter: Option<String>,

        /// Task export JSON file, or "-" for stdin
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Reference time for relative dates (default: now)
        #[arg(long)]
        now: Option<String>,
    },

    /// List defined reports
    Reports,

    /// Show a report definition
    #[command(alias = "s")]
    Show {
        /// Report name
        name: String,
    },

    /// List attributes, including UDAs
    Udas,

    /// Manage trep configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Preset choices for `--preset`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetArg {
    Current,
    Legacy,
    /// Start from an empty configuration
    None,
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file path
    Path,
}
