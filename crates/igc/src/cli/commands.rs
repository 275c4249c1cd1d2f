//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::OutputFormat;

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// IGC files to check, or `-` for standard input
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Do not report characters outside the IGC character set
    #[arg(long)]
    pub allow_invalid_chars: bool,
}

/// Dump command arguments.
#[derive(Debug, Args)]
pub struct DumpCommand {
    /// IGC file to dump, or `-` for standard input
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format (overrides configuration)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Headers command arguments.
#[derive(Debug, Args)]
pub struct HeadersCommand {
    /// IGC file to read, or `-` for standard input
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Manufacturers command arguments.
#[derive(Debug, Args)]
pub struct ManufacturersCommand {
    /// Only list IGC-approved manufacturers
    #[arg(short, long)]
    pub approved: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
