//! CLI command parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Engraver - generate engraving-ready line art from a theme word.
#[derive(Parser)]
#[command(name = "engraver")]
#[command(about = "Generate engraving-ready line art designs from a theme word")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the TUI interface.
    Tui,

    /// Start the relay server.
    Serve {
        /// Host to bind to (defaults to config).
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (defaults to config).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate one batch of designs and print them.
    #[command(visible_alias = "g")]
    Generate {
        /// Theme word to interpolate into the prompt.
        #[arg(required_unless_present = "surprise")]
        theme: Option<String>,

        /// Use the fixed prompt instead of a theme.
        #[arg(short, long, conflicts_with = "theme")]
        surprise: bool,

        /// Save every design into this directory.
        #[arg(short, long)]
        download: Option<PathBuf>,

        /// Output format (table or json).
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Download one image and save it under a name derived from the design name.
    Download {
        /// Image URL.
        url: String,

        /// Design name used to derive the file name.
        #[arg(short, long, default_value = "Custom Design 1")]
        name: String,

        /// Target directory (defaults to config, then the downloads folder).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Manage configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration.
    Show,

    /// Show the configuration file path.
    Path,
}
