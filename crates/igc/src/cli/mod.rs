//! Command-line interface for igc.
//!
//! This module provides the CLI structure for the `igcparse` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CheckCommand, ConfigCommand, DumpCommand, HeadersCommand, ManufacturersCommand,
};

/// igcparse - Parse and check IGC flight logs
///
/// Reads IGC flight-recorder files, reporting every malformed line without
/// giving up on the rest of the file.
#[derive(Debug, Parser)]
#[command(name = "igcparse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse files and report errors
    Check(CheckCommand),

    /// Print every record of a file
    Dump(DumpCommand),

    /// Print the headers of a file
    Headers(HeadersCommand),

    /// List known flight recorder manufacturers
    Manufacturers(ManufacturersCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// Check if the command reads the loaded configuration.
    ///
    /// Validating an explicit file must not depend on the default one
    /// loading cleanly.
    #[must_use]
    pub fn needs_config(&self) -> bool {
        !matches!(
            self.command,
            Command::Manufacturers(_) | Command::Config(ConfigCommand::Validate { file: Some(_) })
        )
    }
}
