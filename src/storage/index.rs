use super::AttributeSnapshot;
use dashmap::{DashMap, DashSet};
use std::collections::BTreeMap;

/// Thread-safe index of roster members, keyed by slash-separated relative path.
///
/// Member snapshots and the pending-absence set live in separate sharded
/// maps, so a lookup, a snapshot write, and an absence confirmation each lock
/// only the shard holding that path. No operation spans more than one path.
#[derive(Debug, Default)]
pub struct Index {
    members: DashMap<String, AttributeSnapshot>,
    pending_absence: DashSet<String>,
    failed: DashSet<String>,
}

impl Index {
    /// Create a new empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(path, snapshot)` pairs; later duplicates win.
    pub fn from_members<I>(members: I) -> Self
    where
        I: IntoIterator<Item = (String, AttributeSnapshot)>,
    {
        let index = Self::new();
        for (path, snapshot) in members {
            index.members.insert(path, snapshot);
        }
        index
    }

    /// Get a copy of the recorded snapshot for `path`
    #[must_use]
    pub fn get(&self, path: &str) -> Option<AttributeSnapshot> {
        self.members.get(path).map(|e| e.value().clone())
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.members.contains_key(path)
    }

    /// Insert or replace the snapshot for `path`, returning the previous one
    pub fn insert(&self, path: String, snapshot: AttributeSnapshot) -> Option<AttributeSnapshot> {
        self.members.insert(path, snapshot)
    }

    /// Store a fresh snapshot for a file found on disk and confirm it present.
    pub fn record(&self, path: &str, snapshot: AttributeSnapshot) {
        self.members.insert(path.to_string(), snapshot);
        self.confirm(path);
    }

    /// Mark `path` as present for the current scan.
    pub fn confirm(&self, path: &str) {
        self.pending_absence.remove(path);
    }

    /// Note that `path` could not be snapshotted in the current scan.
    ///
    /// The path stays pending and keeps its recorded entry, but is never
    /// resolved as deleted.
    pub fn mark_failed(&self, path: &str) {
        self.failed.insert(path.to_string());
    }

    /// Reset the pending-absence set to every member not `excluded`.
    ///
    /// Excluded members (ignored, or beyond the depth limit) are never visited
    /// by the walk, so seeding them would report them deleted.
    ///
    /// Returns the number of seeded paths.
    pub fn begin_scan<F>(&self, excluded: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.pending_absence.clear();
        self.failed.clear();
        for entry in &self.members {
            if !excluded(entry.key()) {
                self.pending_absence.insert(entry.key().clone());
            }
        }
        self.pending_absence.len()
    }

    /// Number of paths not yet confirmed present in the current scan
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending_absence.len()
    }

    /// Remove every still-pending path from the index and return them sorted.
    ///
    /// Paths marked failed are skipped and keep their entry. Must only run
    /// once all workers of the scan have finished.
    pub fn resolve_absentees(&self) -> Vec<String> {
        let mut absent: Vec<String> = self
            .pending_absence
            .iter()
            .map(|p| p.key().clone())
            .filter(|p| !self.failed.contains(p))
            .collect();
        self.pending_absence.clear();

        for path in &absent {
            self.members.remove(path);
        }

        absent.sort_unstable();
        absent
    }

    /// Paths marked failed in the current scan, sorted
    #[must_use]
    pub fn failed_paths(&self) -> Vec<String> {
        let mut failed: Vec<String> = self.failed.iter().map(|p| p.key().clone()).collect();
        failed.sort_unstable();
        failed
    }

    /// Sorted copy of all members, for persistence and display
    #[must_use]
    pub fn to_sorted(&self) -> BTreeMap<String, AttributeSnapshot> {
        self.members
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Get the number of indexed files
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
