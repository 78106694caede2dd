//! Clap derive structures for the `tangent` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tangent -- inspect live tuning values and write them back to source
#[derive(Debug, Parser)]
#[command(
    name = "tangent",
    version,
    about = "Inspect tuned values and write them back to source files",
    long_about = "Companion CLI for the Tangent live-tuning overlay.\n\n\
        Reads and edits the on-disk value store that running sessions share,\n\
        and pushes values to the source-save endpoint of a dev server.",
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
    /// Save endpoint URL (overrides config)
    #[arg(long, short = 'e', env = "TANGENT_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Value store file (overrides config)
    #[arg(long, short = 's', env = "TANGENT_STORAGE_PATH", global = true)]
    pub storage: Option<PathBuf>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "TANGENT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TANGENT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation for destructive operations
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Inspect and edit the shared value store
    #[command(alias = "st")]
    Store(StoreArgs),

    /// Write one value to a source file through the save endpoint
    Save(SaveArgs),

    /// Write every stored value of one entity to its source file
    Push(PushArgs),

    /// Show the effective keyboard shortcuts
    Keys,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STORE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub command: StoreCommand,
}

#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// List entities with stored values
    #[command(alias = "ls")]
    List,

    /// Show the stored values of one entity
    Get {
        /// Entity identifier
        id: String,
    },

    /// Set one stored value
    Set {
        /// Entity identifier
        id: String,

        /// Key to set
        key: String,

        /// New value (kind inferred unless --kind is given)
        value: String,

        /// Force the value kind
        #[arg(long, short = 'k')]
        kind: Option<ValueKindArg>,
    },

    /// Remove stored values (one entity, or all with --yes)
    #[command(alias = "rm")]
    Clear {
        /// Entity identifier; omit to clear everything
        id: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ValueKindArg {
    Number,
    Text,
    Bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SAVE / PUSH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Source file the endpoint should rewrite
    #[arg(long, short = 'f')]
    pub file: String,

    /// Entity identifier
    pub id: String,

    /// Key to save
    pub key: String,

    /// Value to write (kind inferred unless --kind is given)
    pub value: String,

    /// Force the value kind
    #[arg(long, short = 'k')]
    pub kind: Option<ValueKindArg>,
}

#[derive(Debug, Args)]
pub struct PushArgs {
    /// Entity identifier
    pub id: String,

    /// Source file the endpoint should rewrite
    #[arg(long, short = 'f')]
    pub file: String,

    /// Show what would be sent without contacting the endpoint
    #[arg(long)]
    pub dry_run: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current resolved configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
