//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "batchwrite",
    bin_name = "batchwrite",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "All-or-nothing batch file writes",
    long_about = "batchwrite applies a batch of file writes and appends as a unit: \
                  either every change lands, or the files are restored to \
                  their state before the batch started.",
    after_help = "EXAMPLES:\n\
        \x20 batchwrite apply changes.toml\n\
        \x20 batchwrite apply changes.json --dry-run\n\
        \x20 batchwrite test create --filepath force-app/main/default/lwc/myButton/myButton.js\n\
        \x20 batchwrite completions bash > /usr/share/bash-completion/completions/batchwrite",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply the writes and appends listed in a manifest.
    #[command(
        visible_alias = "a",
        about = "Apply a batch manifest",
        after_help = "MANIFEST FORMAT (TOML):\n\
            \x20 [[append]]\n\
            \x20 path = \"CHANGELOG.md\"\n\
            \x20 content = \"- new entry\\n\"\n\
            \n\
            \x20 [[write]]\n\
            \x20 path = \"bin/run.sh\"\n\
            \x20 content = \"#!/bin/sh\\n\"\n\
            \x20 mode = 0o755\n\
            \n\
            JSON manifests use the same keys: {\"append\": [...], \"write\": [...]}"
    )]
    Apply(ApplyArgs),

    /// Generate test files.
    #[command(about = "Generate test files", subcommand)]
    Test(TestCommands),

    /// Initialise a batchwrite configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 batchwrite init           # default location\n\
            \x20 batchwrite init --local   # .batchwrite.toml in CWD\n\
            \x20 batchwrite init --force   # overwrite an existing file"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 batchwrite completions bash > ~/.local/share/bash-completion/completions/batchwrite\n\
            \x20 batchwrite completions zsh  > ~/.zfunc/_batchwrite\n\
            \x20 batchwrite completions fish > ~/.config/fish/completions/batchwrite.fish"
    )]
    Completions(CompletionsArgs),
}

// ── apply ─────────────────────────────────────────────────────────────────────

/// Arguments for `batchwrite apply`.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Manifest listing the batch. Format is taken from the extension
    /// (`.toml` or `.json`).
    #[arg(value_name = "MANIFEST", help = "TOML or JSON manifest")]
    pub manifest: PathBuf,

    /// Print the queued operations without touching any target.
    #[arg(long = "dry-run", help = "Show what would be applied without applying")]
    pub dry_run: bool,
}

// ── test ──────────────────────────────────────────────────────────────────────

/// Subcommands for `batchwrite test`.
#[derive(Debug, Subcommand)]
pub enum TestCommands {
    /// Create a jest test file for a Lightning web component.
    #[command(
        about = "Create a Lightning web component jest test",
        after_help = "EXAMPLES:\n\
            \x20 batchwrite test create --filepath force-app/main/default/lwc/myButton/myButton.js"
    )]
    Create(TestCreateArgs),
}

/// Arguments for `batchwrite test create`.
#[derive(Debug, Args)]
pub struct TestCreateArgs {
    /// Path to the component's JavaScript file.
    #[arg(
        short = 'f',
        long = "filepath",
        value_name = "FILE",
        help = "Path to Lightning web component .js file to create a test for"
    )]
    pub filepath: PathBuf,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `batchwrite init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.batchwrite.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `batchwrite completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────
