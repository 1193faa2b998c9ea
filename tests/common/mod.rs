#![allow(dead_code)]

use anyhow::Result;
use roster::config::{ComparisonPolicy, ScanConfig};
use roster::scanner::{ScanOutcome, Scanner};
use roster::storage::{Index, Roster};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory tree with a roster kept in memory between scans
pub struct TestTree {
    pub temp_dir: TempDir,
    pub roster: Roster,
}

impl TestTree {
    /// Create an empty tree using the default configuration
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            roster: Roster::default(),
        })
    }

    /// Create an empty tree with a specific comparison policy
    pub fn with_policy(policy: ComparisonPolicy) -> Result<Self> {
        let mut tree = Self::new()?;
        tree.roster.config.verify = policy;
        Ok(tree)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn roster_path(&self) -> PathBuf {
        self.path().join(roster::DEFAULT_ROSTER_FILE)
    }

    /// Write `content` to the relative path `rel`, creating parents
    pub fn write(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn remove(&self, rel: &str) -> Result<()> {
        fs::remove_file(self.path().join(rel))?;
        Ok(())
    }

    /// Scan with the roster's configuration and the given worker count
    pub fn scan(&mut self, threads: usize) -> Result<ScanOutcome> {
        let scanner = Scanner::new(&self.roster.config)?.with_threads(threads);
        Ok(scanner.scan(self.temp_dir.path(), &mut self.roster.index)?)
    }

    pub fn index(&self) -> &Index {
        &self.roster.index
    }
}

/// Policy comparing everything except the modification time, which is too
/// coarse to detect same-second rewrites
pub fn content_policy() -> ComparisonPolicy {
    ComparisonPolicy {
        modified: false,
        ..ComparisonPolicy::all()
    }
}

/// Configuration with the given policy and default everything else
pub fn config_with(policy: ComparisonPolicy) -> ScanConfig {
    ScanConfig {
        verify: policy,
        ..ScanConfig::default()
    }
}
