//! Clap derive structures for the `hbscope` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hbscope -- browse and refresh the bundle catalog from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "hbscope",
    version,
    about = "Browse the bundle catalog and drive its ETL from the command line",
    long_about = "Command-line client for the bundle catalog backend.\n\n\
        Lists scraped bundles, shows the featured bundle, inspects raw\n\
        landing-page snapshots and triggers the ETL (login required).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL (overrides config)
    #[arg(long, env = "HBSCOPE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long, env = "HBSCOPE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "HBSCOPE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "HBSCOPE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HBSCOPE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Timeout in seconds for long-running jobs (ETL)
    #[arg(long, env = "HBSCOPE_LONG_TIMEOUT", global = true)]
    pub long_timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session
    Login(LoginArgs),

    /// Drop the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse bundles
    #[command(alias = "b")]
    Bundles(BundlesArgs),

    /// Run the ETL (login required)
    Etl(EtlArgs),

    /// Inspect raw landing-page snapshots
    #[command(alias = "raw")]
    RawData(RawDataArgs),

    /// Check backend health
    Health,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username [default: from config, else prompt]
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ── Bundles ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BundlesArgs {
    #[command(subcommand)]
    pub command: BundlesCommand,
}

#[derive(Debug, Subcommand)]
pub enum BundlesCommand {
    /// List bundles
    #[command(alias = "ls")]
    List {
        /// Only bundles flagged active
        #[arg(long, short = 'a')]
        active: bool,
    },

    /// Show the featured bundle
    Featured,

    /// Show one bundle by id
    Get {
        /// Bundle id
        id: String,
    },

    /// Show one bundle by machine name
    ByName {
        /// Bundle machine name
        machine_name: String,
    },
}

// ── ETL ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EtlArgs {
    #[command(subcommand)]
    pub command: EtlCommand,
}

#[derive(Debug, Subcommand)]
pub enum EtlCommand {
    /// Scrape, transform and store bundles, then show the refreshed list size
    Run,
}

// ── Raw data ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RawDataArgs {
    #[command(subcommand)]
    pub command: RawDataCommand,
}

#[derive(Debug, Subcommand)]
pub enum RawDataCommand {
    /// List raw snapshots
    #[command(alias = "ls")]
    List,

    /// Show the most recent snapshot
    Latest,

    /// Show one snapshot by id
    Get {
        /// Snapshot id
        id: String,
    },

    /// Write a snapshot's JSON payload to a file
    Export {
        /// Snapshot id
        id: String,

        /// Destination file
        #[arg(long, short = 'f')]
        file: PathBuf,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Interactive configuration wizard
    Init,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
