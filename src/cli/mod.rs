//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// csvsync - keep a local CSV file and a remote spreadsheet in sync
#[derive(Parser, Debug)]
#[command(name = "csvsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ./csvsync.json, then ~/.csvsync.json)
    #[arg(long, global = true, env = "CSVSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the local file with the remote sheet
    Pull {
        /// Config section or filename
        file: String,

        /// Overwrite local changes (a backup copy is kept)
        #[arg(long, conflicts_with = "continue_")]
        force: bool,

        /// Finish an interrupted pull
        #[arg(long = "continue")]
        continue_: bool,
    },

    /// Replace the remote sheet with the local file
    Push {
        /// Config section or filename
        file: String,

        /// Finish an interrupted push
        #[arg(long = "continue")]
        continue_: bool,
    },

    /// Three-way merge local and remote changes
    Sync {
        /// Config section or filename
        file: String,

        /// Finish a sync after resolving conflicts, or resume an interrupted one
        #[arg(long = "continue")]
        continue_: bool,
    },

    /// Abandon an in-progress sync (restoring the local file) or a stuck pull
    Abort {
        /// Config section or filename
        file: String,
    },

    /// Show sync state and staged files
    Status {
        /// Config section or filename
        file: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
