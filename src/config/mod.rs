/// Ignore-pattern compilation and matching.
pub mod ignore;

pub use ignore::IgnoreSet;

use crate::scanner::ScanError;
use serde::{Deserialize, Serialize};

/// Worker count meaning "one worker per available CPU".
pub const THREADS_NO_LIMIT: usize = 0;

/// Depth meaning "recurse without limit".
pub const DEPTH_NO_LIMIT: usize = 0;

/// Scan configuration stored in the `[config]` block of a roster file.
///
/// A missing roster file yields [`ScanConfig::default`]. An existing file that
/// omits a key gets that key's serde default, which for `ignore` is an empty
/// list rather than the built-in patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Ordered ignore patterns, matched against slash-separated relative paths
    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Attributes recorded for every member and compared between scans
    #[serde(default)]
    pub verify: ComparisonPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Number of scan workers (0 = available parallelism)
    #[serde(default)]
    pub threads: usize,
    /// Maximum recursion depth below the root (0 = unlimited)
    #[serde(default)]
    pub maxdepth: usize,
}

/// Selects which snapshot fields are measured and compared.
///
/// Disabled fields are never computed; for `checksum` this skips reading
/// file content entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPolicy {
    #[serde(rename = "filesize", default = "enabled")]
    pub size: bool,
    #[serde(rename = "permissions", default = "enabled")]
    pub permissions: bool,
    #[serde(rename = "lastmodtime", default = "enabled")]
    pub modified: bool,
    #[serde(rename = "checksum", default = "enabled")]
    pub checksum: bool,
}

impl ComparisonPolicy {
    /// Every field enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            size: true,
            permissions: true,
            modified: true,
            checksum: true,
        }
    }

    /// Every field disabled. Not usable for scanning on its own.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            size: false,
            permissions: false,
            modified: false,
            checksum: false,
        }
    }

    /// Whether no field is enabled, which leaves nothing to compare.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.size || self.permissions || self.modified || self.checksum)
    }
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        Self::all()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            threads: THREADS_NO_LIMIT,
            maxdepth: DEPTH_NO_LIMIT,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore_patterns(),
            runtime: RuntimeConfig::default(),
            verify: ComparisonPolicy::all(),
        }
    }
}

impl ScanConfig {
    /// Check the configuration and compile its ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - The comparison policy enables no field
    /// - Any ignore pattern fails to compile
    pub fn validate(&self) -> Result<IgnoreSet, ScanError> {
        if self.verify.is_empty() {
            return Err(ScanError::EmptyPolicy);
        }
        IgnoreSet::compile(&self.ignore)
    }
}

/// Built-in patterns excluding version-control metadata directories.
#[must_use]
pub fn default_ignore_patterns() -> Vec<String> {
    vec![
        r"(^|/)\.git(/|$)".to_string(),
        r"(^|/)\.svn(/|$)".to_string(),
        r"(^|/)\.hg(/|$)".to_string(),
    ]
}

const fn enabled() -> bool {
    true
}
