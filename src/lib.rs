#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

//! # Roster - Fast Change Auditing for Directory Trees
//!
//! Roster keeps, per directory, a roster file listing every regular file
//! beneath it with a snapshot of its attributes: size, permission bits,
//! modification time and an xxHash3 checksum. Each scan compares the tree
//! against that roster and reports which files are new, modified or deleted.
//!
//! ## Features
//!
//! - **Parallel Scanning**: a single walker feeds a pool of workers over a
//!   rendezvous channel, so memory stays flat on huge trees
//! - **Configurable Comparison**: each attribute can be switched off per roster
//! - **Regex Ignore Rules**: version-control metadata is skipped by default
//! - **Plain-Text Roster**: TOML, sorted by path, diffable and hand-editable
//!
//! ## Architecture
//!
//! - [`scanner`]: traversal, worker pool, result aggregation, absentee resolution
//! - [`storage`]: attribute snapshots, the concurrent index, roster persistence
//! - [`config`]: scan configuration and ignore patterns
//! - [`output`]: console reporting and verbosity
//! - [`commands`]: `scan` and `init` command implementations
//!
//! ## Example Usage
//!
//! ```no_run
//! use roster::scanner::Scanner;
//! use roster::storage::Roster;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = Path::new("/srv/data");
//! let file = dir.join(roster::DEFAULT_ROSTER_FILE);
//!
//! let mut roster = Roster::load(&file)?;
//! let outcome = Scanner::new(&roster.config)?.scan(dir, &mut roster.index)?;
//! for path in &outcome.modified {
//!     println!("~ {path}");
//! }
//! roster.save(&file)?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Scan configuration, comparison policy and ignore patterns.
pub mod config;

/// Output formatting and scan reporting.
pub mod output;

/// Change detection scan engine.
pub mod scanner;

/// Snapshots, the member index and roster file persistence.
pub mod storage;

/// Utility functions and helpers.
pub mod utils;

/// Current version of roster
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Roster file name used when none is given
pub const DEFAULT_ROSTER_FILE: &str = ".roster.toml";

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "ROSTER_LOG";
