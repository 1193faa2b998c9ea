//! Utility functions and helpers.
//!
//! - [`hash`]: streaming XXH3 content checksums
//! - [`permissions`]: cross-platform permission bits
//! - [`thread_pool`]: worker pool construction
//!
//! The free functions here convert filesystem paths and timestamps into the
//! portable forms stored in a roster file.

/// Streaming content checksums
pub mod hash;
/// Unix permission handling
pub mod permissions;
/// Thread pool configuration for scan workers
pub mod thread_pool;

use anyhow::{Context, Result};
use std::path::{Component, Path};
use std::time::{SystemTime, UNIX_EPOCH};

/// Converts `path` into a slash-separated string relative to `base`.
///
/// Returns `None` when `path` is not under `base` or is `base` itself.
/// Non-UTF-8 components are converted lossily.
#[must_use]
pub fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Number of components in a slash-separated relative path (`a/b.txt` is 2).
#[must_use]
pub fn path_depth(relative: &str) -> usize {
    relative.split('/').filter(|s| !s.is_empty()).count()
}

/// Returns the final component of a slash-separated relative path.
#[must_use]
pub fn basename(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

/// Converts a modification time into whole seconds since the Unix epoch.
///
/// Timestamps before the epoch come out negative.
///
/// # Errors
///
/// Returns an error if the timestamp does not fit in an `i64`.
pub fn unix_seconds(time: SystemTime) -> Result<i64> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).context("File modification time too large"),
        Err(before) => i64::try_from(before.duration().as_secs())
            .map(|secs| -secs)
            .context("File modification time too far before the epoch"),
    }
}
