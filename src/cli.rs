//! Command-line interface definitions for roster.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for roster.
#[derive(Parser)]
#[command(
    name = "roster",
    version = crate::VERSION,
    about = "Detect new, modified and deleted files in directory trees",
    long_about = "Keeps a roster of file attributes (size, permissions, mtime, xxHash3 checksum) \
                  per directory and reports what changed since the last update"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Compare directories against their roster and list changes
    ///
    /// Exit status is a bitmask: 1 when files were added, 2 when files were
    /// modified, 4 when files were deleted, 125 on any error.
    Scan {
        /// Directories to scan
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Roster file name inside each directory
        #[arg(short = 'f', long, default_value = crate::DEFAULT_ROSTER_FILE, env = "ROSTER_FILE")]
        file: String,

        /// Write the updated roster back after scanning
        #[arg(short, long)]
        update: bool,

        /// Worker threads, overriding the roster setting (0 = one per CPU)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Write a default roster file into directories
    Init {
        /// Directories to initialize
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Roster file name inside each directory
        #[arg(short = 'f', long, default_value = crate::DEFAULT_ROSTER_FILE, env = "ROSTER_FILE")]
        file: String,

        /// Overwrite an existing roster file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
