//! Output formatting and styling for the roster CLI.
//!
//! Change listings go to stdout, one path per line, so they can be piped.
//! Status lines, warnings and errors go to stderr; status lines are gated by
//! the global verbosity, problems always print.

use crate::scanner::ScanOutcome;
use colored::Colorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

/// How chatty stderr status output is, from `-q` to `-v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Problems only
    Quiet = 0,
    Normal = 1,
    /// Adds per-directory roster updates and the run summary
    Verbose = 2,
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

#[must_use]
pub fn verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        1 => Verbosity::Normal,
        _ => Verbosity::Verbose,
    }
}

fn shown_at(level: Verbosity) -> bool {
    verbosity() >= level
}

/// Green status line, e.g. after `roster init`; hidden by `-q`.
pub fn success(message: &str) {
    if shown_at(Verbosity::Normal) {
        eprintln!("{}", message.green());
    }
}

/// Dimmed detail line, only with `-v`.
pub fn verbose(message: &str) {
    if shown_at(Verbosity::Verbose) {
        eprintln!("{}", message.dimmed());
    }
}

/// Always shown, prefixed with `warning:`.
pub fn warning(message: &str) {
    eprintln!("{} {message}", "warning:".yellow().bold());
}

/// Always shown, prefixed with `error:`.
pub fn error(message: &str) {
    eprintln!("{} {message}", "error:".red().bold());
}

/// Receives the classified paths of a finished scan.
pub trait ScanHandler {
    /// A file with no valid prior entry
    fn on_new(&mut self, path: &str) -> io::Result<()>;
    /// A file whose snapshot changed
    fn on_modified(&mut self, path: &str) -> io::Result<()>;
    /// An indexed file that is gone
    fn on_deleted(&mut self, path: &str) -> io::Result<()>;
}

/// Feed every path of `outcome` to `handler`: new, then modified, then deleted.
///
/// # Errors
///
/// Returns the first error raised by the handler.
pub fn report<H: ScanHandler + ?Sized>(outcome: &ScanOutcome, handler: &mut H) -> io::Result<()> {
    for path in &outcome.new {
        handler.on_new(path)?;
    }
    for path in &outcome.modified {
        handler.on_modified(path)?;
    }
    for path in &outcome.deleted {
        handler.on_deleted(path)?;
    }
    Ok(())
}

/// Prints `+ path`, `~ path` and `- path` lines, colored when enabled.
pub struct ConsoleReporter<W: Write> {
    out: W,
    prefix: Option<String>,
}

impl<W: Write> ConsoleReporter<W> {
    pub const fn new(out: W) -> Self {
        Self { out, prefix: None }
    }

    /// Prepend `prefix/` to every path, for multi-root scans.
    #[must_use]
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, marker: colored::ColoredString, path: &str) -> io::Result<()> {
        match &self.prefix {
            Some(prefix) => writeln!(self.out, "{marker} {prefix}/{path}"),
            None => writeln!(self.out, "{marker} {path}"),
        }
    }
}

impl<W: Write> ScanHandler for ConsoleReporter<W> {
    fn on_new(&mut self, path: &str) -> io::Result<()> {
        self.line("+".green(), path)
    }

    fn on_modified(&mut self, path: &str) -> io::Result<()> {
        self.line("~".yellow(), path)
    }

    fn on_deleted(&mut self, path: &str) -> io::Result<()> {
        self.line("-".red(), path)
    }
}

/// Counts reported paths per kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub new: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl Tally {
    pub fn add(&mut self, outcome: &ScanOutcome) {
        self.new += outcome.new.len();
        self.modified += outcome.modified.len();
        self.deleted += outcome.deleted.len();
    }

    /// One-line summary such as `2 new, 1 modified, 0 deleted`
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} new, {} modified, {} deleted",
            self.new, self.modified, self.deleted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> ScanOutcome {
        ScanOutcome {
            new: vec!["a".into(), "b".into()],
            modified: vec!["c".into()],
            deleted: vec!["d".into()],
            ..ScanOutcome::default()
        }
    }

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Verbose > Verbosity::Normal);
    }

    #[test]
    fn test_verbosity_round_trip() {
        let levels = [Verbosity::Quiet, Verbosity::Normal, Verbosity::Verbose];
        for level in &levels {
            set_verbosity(*level);
            assert_eq!(verbosity(), *level);
        }
        set_verbosity(Verbosity::Normal);
    }

    #[test]
    fn test_console_reporter_lines() {
        colored::control::set_override(false);
        let mut reporter = ConsoleReporter::new(Vec::new());
        report(&outcome(), &mut reporter).unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text, "+ a\n+ b\n~ c\n- d\n");
    }

    #[test]
    fn test_console_reporter_prefix() {
        colored::control::set_override(false);
        let mut reporter = ConsoleReporter::new(Vec::new()).with_prefix(Some("root".into()));
        reporter.on_deleted("x/y").unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text, "- root/x/y\n");
    }

    #[test]
    fn test_tally_summary() {
        let mut tally = Tally::default();
        tally.add(&outcome());
        tally.add(&outcome());
        assert_eq!(tally.summary(), "4 new, 2 modified, 2 deleted");
    }

    #[derive(Default)]
    struct Recording(Vec<String>);

    impl ScanHandler for Recording {
        fn on_new(&mut self, path: &str) -> io::Result<()> {
            self.0.push(format!("new {path}"));
            Ok(())
        }
        fn on_modified(&mut self, path: &str) -> io::Result<()> {
            self.0.push(format!("modified {path}"));
            Ok(())
        }
        fn on_deleted(&mut self, path: &str) -> io::Result<()> {
            self.0.push(format!("deleted {path}"));
            Ok(())
        }
    }

    #[test]
    fn test_report_order() {
        let mut rec = Recording::default();
        report(&outcome(), &mut rec).unwrap();
        assert_eq!(rec.0, vec!["new a", "new b", "modified c", "deleted d"]);
    }
}
