//! Directory traversal feeding the worker pool.

use super::{CancelToken, ScanError};
use crate::config::IgnoreSet;
use crate::utils::{basename, path_depth, relative_slash_path};
use crossbeam_channel::Sender;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// A regular file accepted for snapshotting.
#[derive(Debug)]
pub struct Candidate {
    /// Slash-separated path relative to the scan root
    pub path: String,
    /// Location on disk
    pub absolute: PathBuf,
}

/// Decides which relative paths take part in a scan.
///
/// Shared by the walk and by pending-absence seeding so both agree on what
/// "excluded" means.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    ignore: IgnoreSet,
    roster_name: String,
    max_depth: usize,
}

impl CandidateFilter {
    #[must_use]
    pub fn new(ignore: IgnoreSet, roster_name: impl Into<String>, max_depth: usize) -> Self {
        Self {
            ignore,
            roster_name: roster_name.into(),
            max_depth,
        }
    }

    /// Same filter, excluding files named like `name` instead.
    ///
    /// Only the final component of `name` is kept, so a roster stored as
    /// `meta/audit.toml` excludes every `audit.toml`.
    #[must_use]
    pub fn with_roster_name(&self, name: &str) -> Self {
        let name = Path::new(name)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(name);
        Self {
            ignore: self.ignore.clone(),
            roster_name: name.to_string(),
            max_depth: self.max_depth,
        }
    }

    /// Whether `relative` names a roster file, at any depth.
    #[must_use]
    pub fn is_roster_file(&self, relative: &str) -> bool {
        basename(relative) == self.roster_name
    }

    /// Whether `relative` is ignored or lies beyond the depth limit.
    #[must_use]
    pub fn is_excluded(&self, relative: &str) -> bool {
        (self.max_depth > 0 && path_depth(relative) > self.max_depth)
            || self.ignore.matches(relative)
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Counters describing one walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub dispatched: usize,
    pub ignored: usize,
    /// Symlinks, sockets, devices and the like
    pub special: usize,
}

/// Single producer enumerating the tree under `root`.
pub struct Walker<'a> {
    root: &'a Path,
    filter: &'a CandidateFilter,
    cancel: Option<&'a CancelToken>,
}

impl<'a> Walker<'a> {
    #[must_use]
    pub const fn new(
        root: &'a Path,
        filter: &'a CandidateFilter,
        cancel: Option<&'a CancelToken>,
    ) -> Self {
        Self {
            root,
            filter,
            cancel,
        }
    }

    /// Walk the tree and send every accepted candidate to `queue`.
    ///
    /// Sending blocks until a worker takes the candidate, so enumeration
    /// never runs ahead of processing. `queue` is dropped on return, which
    /// tells the workers no more work is coming.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A directory entry cannot be read
    /// - The scan is cancelled
    /// - Every worker has exited
    pub fn walk(&self, queue: Sender<Candidate>) -> Result<WalkStats, ScanError> {
        let mut stats = WalkStats::default();

        let mut walker = WalkDir::new(self.root).follow_links(false).min_depth(1);
        if self.filter.max_depth() > 0 {
            walker = walker.max_depth(self.filter.max_depth());
        }

        for entry in walker {
            let entry = entry?;
            let file_type = entry.file_type();

            if file_type.is_dir() {
                continue;
            }

            let Some(path) = relative_slash_path(entry.path(), self.root) else {
                continue;
            };

            if !file_type.is_file() {
                trace!(path = %path, "skipping non-regular file");
                stats.special += 1;
                continue;
            }

            if self.filter.is_roster_file(&path) {
                continue;
            }

            if self.filter.is_excluded(&path) {
                trace!(path = %path, "ignored");
                stats.ignored += 1;
                continue;
            }

            if self.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let candidate = Candidate {
                path,
                absolute: entry.into_path(),
            };
            if queue.send(candidate).is_err() {
                return Err(if self.is_cancelled() {
                    ScanError::Cancelled
                } else {
                    ScanError::WorkersGone
                });
            }
            stats.dispatched += 1;
        }

        Ok(stats)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }
}
