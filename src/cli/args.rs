//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// relocheck - build cache relocation checks
///
/// Builds two checkouts of the same project against one shared build cache
/// and verifies the second build reports the task outcomes in a golden table.
#[derive(Parser, Debug)]
#[command(name = "relocheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "RELOCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local relocheck.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run relocation scenarios
    Run(RunArgs),

    /// Compare a saved build log against a golden table
    Check(CheckArgs),

    /// Show or record golden tables
    Golden(GoldenArgs),

    /// Create a project-local relocheck.toml
    Init(InitArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Check tools and show resolved directories
    Status,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario to run (repeatable; defaults to all)
    #[arg(short, long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// Keep the shared build cache from earlier runs
    #[arg(long)]
    pub keep_cache: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Golden table file
    pub golden: PathBuf,

    /// Plain console log of the relocated build
    pub log: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the golden command
#[derive(Parser, Debug)]
pub struct GoldenArgs {
    #[command(subcommand)]
    pub action: GoldenAction,
}

/// Golden subcommands
#[derive(Subcommand, Debug)]
pub enum GoldenAction {
    /// Print a scenario's golden table
    Show {
        /// Scenario name
        scenario: String,
    },

    /// Run a scenario and save the relocated outcomes as its golden table
    Record {
        /// Scenario name
        scenario: String,

        /// Overwrite an existing table without asking
        #[arg(short, long)]
        yes: bool,

        /// Keep the shared build cache from earlier runs
        #[arg(long)]
        keep_cache: bool,
    },
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing relocheck.toml
    #[arg(short, long)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., build.timeout_secs)
        key: String,
        /// Value to set
        value: String,
        /// Write to project-local relocheck.toml instead of global config
        #[arg(long)]
        local: bool,
    },
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}
