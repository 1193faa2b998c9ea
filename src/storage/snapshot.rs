use crate::config::ComparisonPolicy;
use crate::utils::hash::hash_file_streaming;
use crate::utils::permissions::FilePermissions;
use crate::utils::unix_seconds;
use anyhow::{Context, Result};
use std::fs::Metadata;
use std::path::Path;

/// Verifiable attributes of one file at scan time.
///
/// Every field is `None` when it was not measured, either because the
/// comparison policy disabled it or because the snapshot came from a roster
/// written under a narrower policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSnapshot {
    size: Option<u64>,
    permissions: Option<u32>,
    modified: Option<i64>,
    checksum: Option<String>,
}

impl AttributeSnapshot {
    /// The all-unmeasured snapshot.
    #[must_use]
    pub const fn unmeasured() -> Self {
        Self {
            size: None,
            permissions: None,
            modified: None,
            checksum: None,
        }
    }

    /// Build a snapshot from already-known field values.
    ///
    /// An empty checksum string is treated as unmeasured.
    #[must_use]
    pub fn new(
        size: Option<u64>,
        permissions: Option<u32>,
        modified: Option<i64>,
        checksum: Option<String>,
    ) -> Self {
        Self {
            size,
            permissions,
            modified,
            checksum: checksum.filter(|c| !c.is_empty()),
        }
    }

    /// Measure the fields enabled in `policy` for the file at `path`.
    ///
    /// Stat-derived fields come from `metadata`; the checksum streams the
    /// file content and is only computed when the policy asks for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the modification time is unavailable or the file
    /// cannot be read for checksumming.
    pub fn capture(path: &Path, metadata: &Metadata, policy: &ComparisonPolicy) -> Result<Self> {
        let size = policy.size.then(|| metadata.len());

        let permissions = policy
            .permissions
            .then(|| FilePermissions::from_metadata(metadata).mode());

        let modified = if policy.modified {
            let mtime = metadata
                .modified()
                .with_context(|| format!("Failed to get mtime: {}", path.display()))?;
            Some(unix_seconds(mtime)?)
        } else {
            None
        };

        let checksum = if policy.checksum {
            Some(hash_file_streaming(path)?)
        } else {
            None
        };

        Ok(Self {
            size,
            permissions,
            modified,
            checksum,
        })
    }

    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    #[must_use]
    pub const fn permissions(&self) -> Option<u32> {
        self.permissions
    }

    #[must_use]
    pub const fn modified(&self) -> Option<i64> {
        self.modified
    }

    #[must_use]
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// Whether at least one field enabled in `policy` was measured.
    #[must_use]
    pub fn is_valid(&self, policy: &ComparisonPolicy) -> bool {
        !self.matches(&Self::unmeasured(), policy)
    }

    /// Whether every field enabled in `policy` is equal in both snapshots.
    ///
    /// A field measured on one side and unmeasured on the other differs.
    #[must_use]
    pub fn matches(&self, other: &Self, policy: &ComparisonPolicy) -> bool {
        (!policy.size || self.size == other.size)
            && (!policy.permissions || self.permissions == other.permissions)
            && (!policy.modified || self.modified == other.modified)
            && (!policy.checksum || self.checksum == other.checksum)
    }

    /// Names of the policy-enabled fields that differ, in roster-file terms.
    #[must_use]
    pub fn changed_fields(&self, other: &Self, policy: &ComparisonPolicy) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if policy.size && self.size != other.size {
            fields.push("size");
        }
        if policy.permissions && self.permissions != other.permissions {
            fields.push("perm");
        }
        if policy.modified && self.modified != other.modified {
            fields.push("last");
        }
        if policy.checksum && self.checksum != other.checksum {
            fields.push("hash");
        }
        fields
    }
}
