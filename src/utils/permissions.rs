use std::fs::Metadata;

/// Mask applied to the raw mode so only permission bits (including
/// setuid/setgid/sticky) are recorded, never the file-type bits.
pub const PERMISSION_MASK: u32 = 0o7777;

/// Cross-platform file permission bits as recorded in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilePermissions {
    mode: u32,
}

impl FilePermissions {
    /// Create permissions from a raw mode value
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        Self {
            mode: mode & PERMISSION_MASK,
        }
    }

    /// Get the raw mode value
    #[must_use]
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Read permission bits from already-fetched metadata
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Self::from_mode(metadata.mode())
        }

        #[cfg(windows)]
        {
            // Read-only flag is the only permission Windows exposes reliably
            let mode = if metadata.permissions().readonly() {
                0o444
            } else {
                0o644
            };
            Self::from_mode(mode)
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = metadata;
            Self::from_mode(0o644)
        }
    }
}
