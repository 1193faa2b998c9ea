use crate::output::{self, ConsoleReporter, Tally};
use crate::scanner::{ScanError, ScanOutcome, Scanner};
use crate::storage::{Access, RosterFile};
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info_span;

/// Options shared by every directory of one `roster scan` run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Roster file name inside each directory
    pub file: String,
    /// Persist the updated roster after scanning
    pub update: bool,
    /// Worker count override
    pub threads: Option<usize>,
}

/// Scan every directory in turn and print the changes to stdout.
///
/// A failing directory is reported and the remaining ones are still
/// scanned. Returns the process exit status.
pub fn execute(dirs: &[PathBuf], options: &ScanOptions) -> i32 {
    let stdout = io::stdout();
    let mut tally = Tally::default();
    let mut failed = false;

    for dir in dirs {
        let prefix = (dirs.len() > 1).then(|| dir.display().to_string());
        let mut reporter = ConsoleReporter::new(stdout.lock()).with_prefix(prefix);

        match scan_directory(dir, options, &mut reporter) {
            Ok(outcome) => {
                tally.add(&outcome);
                if !outcome.failed.is_empty() {
                    output::warning(&format!(
                        "{}: {} file(s) could not be read and were skipped",
                        dir.display(),
                        outcome.failed.len()
                    ));
                }
            }
            Err(e) => {
                failed = true;
                let kind = e
                    .downcast_ref::<ScanError>()
                    .map_or("Error", ScanError::error_type);
                output::error(&format!("{} ({kind}): {e:#}", dir.display()));
            }
        }
    }

    output::verbose(&tally.summary());
    super::exit_code(&tally, failed)
}

/// Load the roster of `dir`, scan it, report through `reporter` and save the
/// roster back when asked.
///
/// The roster file stays locked for the whole cycle.
///
/// # Errors
///
/// Returns an error if:
/// - The roster cannot be opened, locked, or parsed
/// - The scan fails
/// - Writing the report or the updated roster fails
pub fn scan_directory<W: Write>(
    dir: &Path,
    options: &ScanOptions,
    reporter: &mut ConsoleReporter<W>,
) -> Result<ScanOutcome> {
    let span = info_span!("directory", dir = %dir.display());
    let _enter = span.enter();

    let access = if options.update {
        Access::ReadWrite
    } else {
        Access::ReadOnly
    };
    let mut handle = RosterFile::open(&dir.join(&options.file), access)?;
    let mut roster = handle.load()?;

    let mut scanner = Scanner::new(&roster.config)
        .with_context(|| format!("Invalid configuration in {}", handle.path().display()))?
        .with_roster_name(&options.file);
    if let Some(threads) = options.threads {
        scanner = scanner.with_threads(threads);
    }

    let outcome = scanner.scan(dir, &mut roster.index)?;
    output::report(&outcome, reporter).context("Failed to write scan report")?;

    if options.update {
        handle.save(&roster)?;
        output::verbose(&format!(
            "Updated {} ({} files)",
            handle.path().display(),
            roster.index.len()
        ));
    }

    Ok(outcome)
}
