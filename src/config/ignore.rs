//! Ignore-pattern predicate.
//!
//! Each pattern is a regular expression searched (unanchored) in the
//! slash-separated relative path of a file. A pattern wrapped in backticks
//! is taken literally: `` `a+b.txt` `` matches the text `a+b.txt` only.

use crate::scanner::ScanError;
use regex::RegexSet;

/// Compiled, immutable set of ignore patterns.
///
/// Matching never mutates the set, so one instance is shared by every
/// worker and by pending-absence seeding.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    set: RegexSet,
}

impl IgnoreSet {
    /// Compile `patterns` in order.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`] naming the first pattern that
    /// fails to compile.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ScanError> {
        let mut sources = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let source = match literal_body(pattern) {
                Some(literal) => regex::escape(literal),
                None => pattern.to_string(),
            };

            // Compile individually so the error can name the culprit
            regex::Regex::new(&source).map_err(|source| ScanError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            sources.push(source);
        }

        let set = RegexSet::new(&sources).map_err(|source| ScanError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", "),
            source,
        })?;

        Ok(Self { set })
    }

    /// Whether `relative_path` matches any pattern.
    #[must_use]
    pub fn matches(&self, relative_path: &str) -> bool {
        self.set.is_match(relative_path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Returns the inner text of a backtick-wrapped literal pattern.
fn literal_body(pattern: &str) -> Option<&str> {
    if pattern.chars().count() < 2 {
        return None;
    }
    pattern.strip_prefix('`')?.strip_suffix('`')
}
