use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that abort a whole scan.
///
/// Failures confined to a single file never surface here; they are logged
/// and that file is left out of the results.
#[derive(Debug)]
pub enum ScanError {
    /// The scan root does not exist
    RootNotFound(PathBuf),
    /// The scan root exists but is not a directory
    RootNotDirectory(PathBuf),
    /// A directory entry could not be read during the walk
    Traversal {
        /// Path being visited, when walkdir knows it
        path: Option<PathBuf>,
        source: walkdir::Error,
    },
    /// An ignore pattern failed to compile
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    /// The comparison policy enables no attribute
    EmptyPolicy,
    /// The worker pool could not be created
    WorkerPool(rayon::ThreadPoolBuildError),
    /// A result collector thread could not be started
    Spawn(io::Error),
    /// Every worker exited before the walk finished dispatching
    WorkersGone,
    /// A result collector thread panicked
    CollectorPanicked,
    /// The scan was cancelled through its token
    Cancelled,
}

impl ScanError {
    /// Whether the error comes from the configuration rather than the filesystem
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidPattern { .. } | Self::EmptyPolicy)
    }

    /// Get a short description of the error type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::RootNotFound(_) | Self::RootNotDirectory(_) => "Invalid Root",
            Self::Traversal { .. } => "Traversal Error",
            Self::InvalidPattern { .. } | Self::EmptyPolicy => "Configuration Error",
            Self::WorkerPool(_) | Self::Spawn(_) | Self::WorkersGone | Self::CollectorPanicked => {
                "Worker Pool Error"
            }
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound(path) => write!(f, "directory not found: {}", path.display()),
            Self::RootNotDirectory(path) => write!(f, "not a directory: {}", path.display()),
            Self::Traversal {
                path: Some(path),
                source,
            } => write!(f, "failed to walk {}: {source}", path.display()),
            Self::Traversal { path: None, source } => write!(f, "failed to walk tree: {source}"),
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid ignore pattern '{pattern}': {source}")
            }
            Self::EmptyPolicy => write!(f, "verify policy enables no attribute to compare"),
            Self::WorkerPool(e) => write!(f, "failed to start scan workers: {e}"),
            Self::Spawn(e) => write!(f, "failed to start result collector: {e}"),
            Self::WorkersGone => write!(f, "all scan workers exited early"),
            Self::CollectorPanicked => write!(f, "result collector panicked"),
            Self::Cancelled => write!(f, "scan cancelled"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Traversal { source, .. } => Some(source),
            Self::InvalidPattern { source, .. } => Some(source),
            Self::WorkerPool(e) => Some(e),
            Self::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for ScanError {
    fn from(source: walkdir::Error) -> Self {
        Self::Traversal {
            path: source.path().map(std::path::Path::to_path_buf),
            source,
        }
    }
}
