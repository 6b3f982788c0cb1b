//! CLI module for Warden
//!
//! Command-line parsing for the warden-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Warden - credential and token lifecycle server
#[derive(Parser, Debug)]
#[command(
    name = "warden-server",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Warden - credential and token lifecycle server",
    long_about = "Password registration and login, short-lived access tokens and rotating\n\
                  refresh tokens over a small JSON API.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new project.",
    after_help = "EXAMPLES:\n    \
                  warden-server init               # Scaffold warden.toml and .env.example\n    \
                  warden-server                    # Start the server (requires warden.toml)\n    \
                  warden-server purge              # Delete expired and revoked refresh tokens\n    \
                  warden-server --config my.toml   # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "warden.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Initialize a new Warden project with configuration files
    ///
    /// Creates warden.toml, .env.example and .gitignore.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8080")]
        port: u16,
    },

    /// Delete expired and revoked refresh tokens, then exit
    Purge,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
