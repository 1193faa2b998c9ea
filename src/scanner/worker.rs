use super::CancelToken;
use super::aggregator::Emitter;
use super::walker::Candidate;
use crate::config::ComparisonPolicy;
use crate::storage::{AttributeSnapshot, Index};
use anyhow::Context;
use crossbeam_channel::Receiver;
use std::fs;
use tracing::{debug, trace, warn};

/// How a candidate compares with its indexed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No valid entry was indexed for the path
    New,
    /// The entry differs under the comparison policy
    Changed,
    /// The entry matches
    Unchanged,
}

/// Compare a fresh snapshot against the indexed one.
#[must_use]
pub fn classify(
    previous: Option<&AttributeSnapshot>,
    current: &AttributeSnapshot,
    policy: &ComparisonPolicy,
) -> Classification {
    match previous {
        Some(prev) if prev.is_valid(policy) => {
            if prev.matches(current, policy) {
                Classification::Unchanged
            } else {
                Classification::Changed
            }
        }
        _ => Classification::New,
    }
}

/// One consumer of the work queue.
pub(super) struct Worker<'a> {
    pub id: usize,
    pub index: &'a Index,
    pub policy: &'a ComparisonPolicy,
    pub emitter: Emitter,
    pub queue: Receiver<Candidate>,
    pub cancel: Option<&'a CancelToken>,
}

impl Worker<'_> {
    /// Process candidates until the queue closes or the scan is cancelled.
    pub fn run(self) {
        trace!(worker = self.id, "worker started");
        let mut processed = 0usize;

        while let Ok(candidate) = self.queue.recv() {
            if self.cancel.is_some_and(CancelToken::is_cancelled) {
                break;
            }
            self.process(candidate);
            processed += 1;
        }

        trace!(worker = self.id, processed, "worker finished");
    }

    fn process(&self, candidate: Candidate) {
        let captured = fs::symlink_metadata(&candidate.absolute)
            .with_context(|| format!("Failed to stat {}", candidate.absolute.display()))
            .and_then(|metadata| {
                AttributeSnapshot::capture(&candidate.absolute, &metadata, self.policy)
            });
        let current = match captured {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %candidate.path, "skipping file: {e:#}");
                self.index.mark_failed(&candidate.path);
                return;
            }
        };

        let previous = self.index.get(&candidate.path);
        match classify(previous.as_ref(), &current, self.policy) {
            Classification::New => {
                debug!(path = %candidate.path, "new");
                self.index.record(&candidate.path, current);
                self.emitter.emit_new(candidate.path);
            }
            Classification::Changed => {
                if let Some(prev) = &previous {
                    debug!(
                        path = %candidate.path,
                        fields = ?prev.changed_fields(&current, self.policy),
                        "modified"
                    );
                }
                self.index.record(&candidate.path, current);
                self.emitter.emit_modified(candidate.path);
            }
            Classification::Unchanged => {
                self.index.confirm(&candidate.path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::aggregator::{Collected, ResultAggregator};
    use crossbeam_channel::unbounded;
    use tempfile::TempDir;

    fn snap(size: u64) -> AttributeSnapshot {
        AttributeSnapshot::new(Some(size), Some(0o644), Some(100), None)
    }

    #[test]
    fn test_classify_without_previous_is_new() {
        let policy = ComparisonPolicy::all();
        assert_eq!(classify(None, &snap(1), &policy), Classification::New);
    }

    #[test]
    fn test_classify_invalid_previous_is_new() {
        let policy = ComparisonPolicy::all();
        let prev = AttributeSnapshot::unmeasured();
        assert_eq!(classify(Some(&prev), &snap(1), &policy), Classification::New);
    }

    #[test]
    fn test_classify_changed_and_unchanged() {
        let policy = ComparisonPolicy {
            checksum: false,
            ..ComparisonPolicy::all()
        };
        assert_eq!(
            classify(Some(&snap(1)), &snap(1), &policy),
            Classification::Unchanged
        );
        assert_eq!(
            classify(Some(&snap(1)), &snap(2), &policy),
            Classification::Changed
        );
    }

    #[test]
    fn test_classify_ignores_disabled_fields() {
        let policy = ComparisonPolicy {
            size: false,
            checksum: false,
            ..ComparisonPolicy::all()
        };
        assert_eq!(
            classify(Some(&snap(1)), &snap(2), &policy),
            Classification::Unchanged
        );
    }

    fn run_worker(index: &Index, candidates: Vec<Candidate>) -> Collected {
        let (emitter, aggregator) = ResultAggregator::start().unwrap();
        let (tx, rx) = unbounded();
        for candidate in candidates {
            tx.send(candidate).unwrap();
        }
        drop(tx);

        Worker {
            id: 0,
            index,
            policy: &ComparisonPolicy::all(),
            emitter,
            queue: rx,
            cancel: None,
        }
        .run();
        aggregator.finish().unwrap()
    }

    #[test]
    fn test_vanished_file_is_marked_failed() {
        let temp = TempDir::new().unwrap();
        let index = Index::from_members([("gone.txt".to_string(), snap(1))]);
        index.begin_scan(|_| false);

        let collected = run_worker(
            &index,
            vec![Candidate {
                path: "gone.txt".to_string(),
                absolute: temp.path().join("gone.txt"),
            }],
        );

        assert!(collected.new.is_empty());
        assert!(collected.modified.is_empty());
        assert_eq!(index.failed_paths(), vec!["gone.txt"]);
        assert!(index.resolve_absentees().is_empty());
        assert!(index.contains("gone.txt"));
    }

    #[test]
    fn test_worker_records_new_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();
        let index = Index::new();

        let collected = run_worker(
            &index,
            vec![Candidate {
                path: "a.txt".to_string(),
                absolute: temp.path().join("a.txt"),
            }],
        );

        assert_eq!(collected.new, vec!["a.txt"]);
        let snapshot = index.get("a.txt").unwrap();
        assert_eq!(snapshot.size(), Some(1));
        assert!(snapshot.checksum().is_some());
    }
}
