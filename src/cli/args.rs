//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read this config file instead of the default locations
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// teamkv - a revisioned key-value store for team chat
#[derive(Parser, Debug)]
#[command(name = "teamkv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot until shutdown or end of input
    #[command(
        name = "serve",
        long_about = "Run the bot.\n\n\
            Listens on the configured team channel, answers every message that starts \
            with `!storage`, and stops when someone sends `!storage shutdown` or the \
            input ends.",
        after_help = "\
EXAMPLES:
    # Serve from stdin, one message per line
    KB_TEAMNAME=acme teamkv serve

    # Persist entries between runs
    teamkv serve --store file --store-path ./store.json

INPUT FORMAT (stdio transport):
    alice: !storage put cfg retries 3
    !storage get cfg retries"
    )]
    Serve {
        /// Store provider (memory, file)
        #[arg(long, value_name = "PROVIDER")]
        store: Option<String>,

        /// Store file for the file provider
        #[arg(long, value_name = "PATH")]
        store_path: Option<PathBuf>,

        /// Transport provider (stdio)
        #[arg(long, value_name = "PROVIDER")]
        transport: Option<String>,
    },

    /// Handle a single message and print the reply
    #[command(
        name = "exec",
        after_help = "\
EXAMPLES:
    teamkv exec '!storage list'
    teamkv exec --sender alice '!storage put cfg retries 3'
    teamkv exec !storage get cfg retries"
    )]
    Exec {
        /// Message text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Sender to attribute the message to (default: the bot username)
        #[arg(long)]
        sender: Option<String>,

        /// Store provider (memory, file)
        #[arg(long, value_name = "PROVIDER")]
        store: Option<String>,

        /// Store file for the file provider
        #[arg(long, value_name = "PATH")]
        store_path: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
