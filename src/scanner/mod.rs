//! # Change Detection Scan
//!
//! A scan walks one directory tree and compares every regular file against
//! the [`Index`] built by earlier scans.
//!
//! ## Pipeline
//!
//! ```text
//!                     bounded(0)              unbounded
//! ┌────────┐  Candidate  ┌──────────┐  path  ┌────────────┐
//! │ Walker │ ──────────> │ Worker×N │ ─────> │ Collectors │ -> new / modified
//! └────────┘             └──────────┘        └────────────┘
//!                             │
//!                             └── record / confirm ──> Index
//! ```
//!
//! 1. Every indexed path not excluded by the configuration is marked
//!    pending-absent
//! 2. The walker runs on the calling thread and hands candidates to a
//!    dedicated pool of N workers, one at a time
//! 3. Workers snapshot each candidate, classify it, update the index and
//!    emit new or modified paths
//! 4. Once the walk is done and every worker has returned, the collectors
//!    are drained
//! 5. Paths still pending are removed from the index and reported deleted
//!
//! Step 5 only starts after step 4 completes. A path can therefore never be
//! reported deleted while a worker is still about to confirm it.
//!
//! ## Ownership
//!
//! [`Scanner::scan`] takes the index by `&mut`, so two scans can never share
//! one index. Inside a scan the workers share it through `&Index`, whose
//! maps are sharded and safe for concurrent use.

/// Fan-in of worker results
pub mod aggregator;
/// Scan error types
pub mod errors;
/// Directory traversal and candidate filtering
pub mod walker;
/// Snapshot classification workers
pub mod worker;

pub use errors::ScanError;
pub use walker::{Candidate, CandidateFilter, WalkStats};
pub use worker::{Classification, classify};

use crate::config::{ComparisonPolicy, ScanConfig};
use crate::storage::Index;
use crate::utils::thread_pool::{build_worker_pool, resolve_threads};
use aggregator::ResultAggregator;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, info_span};
use walker::Walker;
use worker::Worker;

/// Cooperative cancellation shared between a scan and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the scan to stop. The walker stops dispatching and workers stop
    /// at their next candidate.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Files with no valid prior entry, sorted
    pub new: Vec<String>,
    /// Files whose snapshot changed, sorted
    pub modified: Vec<String>,
    /// Indexed files no longer found, sorted
    pub deleted: Vec<String>,
    /// Files skipped because they could not be snapshotted, sorted.
    /// They appear in no other list and keep their indexed entry.
    pub failed: Vec<String>,
    pub walk: WalkStats,
}

impl ScanOutcome {
    /// Whether nothing was added, modified or deleted
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.new.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Total number of reported changes
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.new.len() + self.modified.len() + self.deleted.len()
    }
}

/// A configured scan, reusable across roots and indexes.
#[derive(Debug, Clone)]
pub struct Scanner {
    filter: CandidateFilter,
    policy: ComparisonPolicy,
    threads: usize,
    cancel: Option<CancelToken>,
}

impl Scanner {
    /// Build a scanner from a roster configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the policy is empty or an ignore
    /// pattern does not compile.
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let ignore = config.validate()?;
        debug!(
            patterns = ignore.len(),
            maxdepth = config.runtime.maxdepth,
            "scan configuration validated"
        );
        Ok(Self {
            filter: CandidateFilter::new(
                ignore,
                crate::DEFAULT_ROSTER_FILE,
                config.runtime.maxdepth,
            ),
            policy: config.verify,
            threads: resolve_threads(config.runtime.threads),
            cancel: None,
        })
    }

    /// Exclude files with this basename instead of the default roster name
    #[must_use]
    pub fn with_roster_name(mut self, name: &str) -> Self {
        self.filter = self.filter.with_roster_name(name);
        self
    }

    /// Override the worker count; `0` means one per CPU
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = resolve_threads(threads);
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Scan `root` and bring `index` up to date with it.
    ///
    /// On success the index holds exactly the files that were seen, plus
    /// excluded and failed ones carried over, and the outcome lists every
    /// difference from its previous state.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `root` is missing or not a directory
    /// - The walk hits an unreadable directory
    /// - The worker pool or collectors cannot be started
    /// - The scan is cancelled
    ///
    /// After an error no absentees are resolved, so nothing is removed from
    /// the index, though entries already recorded by workers stay updated.
    pub fn scan(&self, root: &Path, index: &mut Index) -> Result<ScanOutcome, ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::RootNotDirectory(root.to_path_buf()));
        }

        let span = info_span!("scan", root = %root.display(), threads = self.threads);
        let _enter = span.enter();

        let index: &Index = index;
        let seeded = index.begin_scan(|path| {
            self.filter.is_roster_file(path) || self.filter.is_excluded(path)
        });
        debug!(indexed = index.len(), seeded, "pending absence seeded");

        let pool = build_worker_pool(self.threads).map_err(ScanError::WorkerPool)?;
        let (emitter, aggregator) = ResultAggregator::start()?;
        let (work_tx, work_rx) = crossbeam_channel::bounded::<Candidate>(0);
        let cancel = self.cancel.as_ref();

        let walk_result = pool.in_place_scope(|s| {
            for id in 0..self.threads {
                let worker = Worker {
                    id,
                    index,
                    policy: &self.policy,
                    emitter: emitter.clone(),
                    queue: work_rx.clone(),
                    cancel,
                };
                s.spawn(move |_| worker.run());
            }
            drop(work_rx);

            Walker::new(root, &self.filter, cancel).walk(work_tx)
        });

        drop(emitter);
        let collected = aggregator.finish()?;
        let walk = walk_result?;

        let deleted = index.resolve_absentees();

        let mut outcome = ScanOutcome {
            new: collected.new,
            modified: collected.modified,
            deleted,
            failed: index.failed_paths(),
            walk,
        };
        outcome.new.sort_unstable();
        outcome.modified.sort_unstable();

        info!(
            new = outcome.new.len(),
            modified = outcome.modified.len(),
            deleted = outcome.deleted.len(),
            failed = outcome.failed.len(),
            "scan complete"
        );

        Ok(outcome)
    }
}
