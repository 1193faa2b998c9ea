//! The roster file: scan configuration plus the member index, as TOML.
//!
//! Unmeasured snapshot fields are written with fixed sentinel values so the
//! document schema stays flat and every member carries all four keys.

use super::{AttributeSnapshot, Index};
use crate::config::ScanConfig;
use anyhow::{Context, Result, bail};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persisted `size` of an unmeasured snapshot.
pub const SIZE_UNMEASURED: i64 = -1;
/// Persisted `perm` of an unmeasured snapshot.
pub const PERM_UNMEASURED: u32 = u32::MAX;
/// Persisted `last` of an unmeasured snapshot.
pub const MTIME_UNMEASURED: i64 = i64::MIN;
/// Persisted `hash` of an unmeasured snapshot.
pub const HASH_UNMEASURED: &str = "";

/// Permissions of roster files created on disk.
#[cfg(unix)]
pub const ROSTER_FILE_MODE: u32 = 0o600;

/// A loaded roster: configuration and member index for one directory tree.
#[derive(Debug, Default)]
pub struct Roster {
    pub config: ScanConfig,
    pub index: Index,
}

/// On-disk layout of a roster file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RosterDocument {
    #[serde(default)]
    config: ScanConfig,
    #[serde(default)]
    members: BTreeMap<String, MemberRecord>,
}

/// One `[members."path"]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(default = "size_unmeasured")]
    pub size: i64,
    #[serde(default = "perm_unmeasured")]
    pub perm: u32,
    #[serde(default = "mtime_unmeasured")]
    pub last: i64,
    #[serde(default)]
    pub hash: String,
}

impl From<&AttributeSnapshot> for MemberRecord {
    fn from(snapshot: &AttributeSnapshot) -> Self {
        Self {
            size: snapshot
                .size()
                .map_or(SIZE_UNMEASURED, |s| i64::try_from(s).unwrap_or(i64::MAX)),
            perm: snapshot.permissions().unwrap_or(PERM_UNMEASURED),
            last: snapshot.modified().unwrap_or(MTIME_UNMEASURED),
            hash: snapshot.checksum().unwrap_or(HASH_UNMEASURED).to_string(),
        }
    }
}

impl From<MemberRecord> for AttributeSnapshot {
    fn from(record: MemberRecord) -> Self {
        Self::new(
            u64::try_from(record.size).ok(),
            (record.perm != PERM_UNMEASURED).then_some(record.perm),
            (record.last != MTIME_UNMEASURED).then_some(record.last),
            Some(record.hash),
        )
    }
}

impl Roster {
    /// Create a roster with the given configuration and no members
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            index: Index::new(),
        }
    }

    /// Parse a roster document and validate its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the configuration is
    /// invalid (e.g. an ignore pattern does not compile).
    pub fn from_toml(content: &str) -> Result<Self> {
        let document: RosterDocument =
            toml::from_str(content).context("Failed to parse roster document")?;

        document
            .config
            .validate()
            .context("Invalid roster configuration")?;

        let index = Index::from_members(
            document
                .members
                .into_iter()
                .map(|(path, record)| (path, AttributeSnapshot::from(record))),
        );

        Ok(Self {
            config: document.config,
            index,
        })
    }

    /// Serialize the roster, members in sorted path order.
    ///
    /// # Errors
    ///
    /// Returns an error if TOML serialization fails
    pub fn to_toml(&self) -> Result<String> {
        let document = RosterDocument {
            config: self.config.clone(),
            members: self
                .index
                .to_sorted()
                .iter()
                .map(|(path, snapshot)| (path.clone(), MemberRecord::from(snapshot)))
                .collect(),
        };
        toml::to_string_pretty(&document).context("Failed to serialize roster")
    }

    /// Load the roster at `path`, or the default roster if it does not exist.
    ///
    /// # Errors
    ///
    /// See [`RosterFile::open`] and [`RosterFile::load`].
    pub fn load(path: &Path) -> Result<Self> {
        RosterFile::open(path, Access::ReadOnly)?.load()
    }

    /// Write the roster to `path`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// See [`RosterFile::open`] and [`RosterFile::save`].
    pub fn save(&self, path: &Path) -> Result<()> {
        RosterFile::open(path, Access::ReadWrite)?.save(self)
    }
}

/// How a roster file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Shared lock; the file is never created or written.
    ReadOnly,
    /// Exclusive lock; the file is created if missing.
    ReadWrite,
}

/// An open, locked roster file.
///
/// The advisory lock is held until the handle is dropped, so a
/// load → scan → save cycle done through one handle cannot interleave with
/// another process updating the same roster. A file created by
/// [`Access::ReadWrite`] that is never saved is removed again on drop.
#[derive(Debug)]
pub struct RosterFile {
    path: PathBuf,
    access: Access,
    file: Option<File>,
    created: bool,
}

impl RosterFile {
    /// Open and lock the roster file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory does not exist or is not a directory
    /// - `path` exists but is not a regular file
    /// - The file cannot be opened, created, or locked
    pub fn open(path: &Path, access: Access) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        match fs::metadata(dir) {
            Ok(meta) if !meta.is_dir() => bail!("Invalid file path: {}", dir.display()),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                bail!("Directory not found: {}", dir.display())
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to stat {}", dir.display()));
            }
        }

        if let Ok(meta) = fs::metadata(path)
            && !meta.file_type().is_file()
        {
            bail!("Not a regular file: {}", path.display());
        }

        let mut created = false;
        let file = match access {
            Access::ReadOnly => match File::open(path) {
                Ok(file) => {
                    file.lock_shared()
                        .with_context(|| format!("Failed to lock roster: {}", path.display()))?;
                    Some(file)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to open roster: {}", path.display()));
                }
            },
            Access::ReadWrite => {
                let mut options = OpenOptions::new();
                options.read(true).write(true);
                #[cfg(unix)]
                {
                    use std::os::unix::fs::OpenOptionsExt;
                    options.mode(ROSTER_FILE_MODE);
                }
                let file = match options.clone().create_new(true).open(path) {
                    Ok(file) => {
                        created = true;
                        Ok(file)
                    }
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => options.open(path),
                    Err(e) => Err(e),
                }
                .with_context(|| format!("Failed to open roster: {}", path.display()))?;
                file.lock_exclusive()
                    .with_context(|| format!("Failed to lock roster: {}", path.display()))?;
                Some(file)
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            access,
            file,
            created,
        })
    }

    /// Path this handle was opened with
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the roster; a missing or empty file yields the default roster.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the document is invalid
    pub fn load(&mut self) -> Result<Roster> {
        let Some(file) = self.file.as_mut() else {
            debug!(path = %self.path.display(), "roster not found, using defaults");
            return Ok(Roster::default());
        };

        let mut content = String::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read roster: {}", self.path.display()))?;

        if content.trim().is_empty() {
            debug!(path = %self.path.display(), "roster is empty, using defaults");
            return Ok(Roster::default());
        }

        let roster = Roster::from_toml(&content)
            .with_context(|| format!("Invalid roster file: {}", self.path.display()))?;
        debug!(
            path = %self.path.display(),
            members = roster.index.len(),
            "roster loaded"
        );
        Ok(roster)
    }

    /// Replace the file content with `roster`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is read-only, or serialization or
    /// writing fails
    pub fn save(&mut self, roster: &Roster) -> Result<()> {
        if self.access != Access::ReadWrite {
            bail!("Roster opened read-only: {}", self.path.display());
        }
        let Some(file) = self.file.as_mut() else {
            bail!("Roster not open: {}", self.path.display());
        };

        let data = roster.to_toml()?;

        file.set_len(0).context("Failed to truncate roster file")?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(data.as_bytes())
            .context("Failed to write roster data")?;
        file.flush().context("Failed to flush roster data")?;
        file.sync_all().context("Failed to sync roster file")?;
        self.created = false;

        debug!(
            path = %self.path.display(),
            members = roster.index.len(),
            "roster saved"
        );
        Ok(())
    }
}

impl Drop for RosterFile {
    fn drop(&mut self) {
        if self.created && fs::remove_file(&self.path).is_ok() {
            debug!(path = %self.path.display(), "removed unsaved roster");
        }
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}

const fn size_unmeasured() -> i64 {
    SIZE_UNMEASURED
}

const fn perm_unmeasured() -> u32 {
    PERM_UNMEASURED
}

const fn mtime_unmeasured() -> i64 {
    MTIME_UNMEASURED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComparisonPolicy;
    use tempfile::tempdir;

    #[test]
    fn test_sentinels_round_trip() {
        let unmeasured = MemberRecord::from(&AttributeSnapshot::unmeasured());
        assert_eq!(unmeasured.size, -1);
        assert_eq!(unmeasured.perm, u32::MAX);
        assert_eq!(unmeasured.last, i64::MIN);
        assert_eq!(unmeasured.hash, "");
        assert_eq!(
            AttributeSnapshot::from(unmeasured),
            AttributeSnapshot::unmeasured()
        );
    }

    #[test]
    fn test_missing_member_keys_are_unmeasured() -> Result<()> {
        let roster = Roster::from_toml(
            r#"
            [members."a.txt"]
            size = 10
            "#,
        )?;
        let snapshot = roster.index.get("a.txt").unwrap();
        assert_eq!(snapshot.size(), Some(10));
        assert_eq!(snapshot.permissions(), None);
        assert_eq!(snapshot.modified(), None);
        assert_eq!(snapshot.checksum(), None);
        Ok(())
    }

    #[test]
    fn test_document_layout() -> Result<()> {
        let roster = Roster::default();
        roster.index.insert(
            "dir/b.txt".into(),
            AttributeSnapshot::new(Some(20), Some(0o644), Some(1_700_000_000), Some("ff".into())),
        );

        let text = roster.to_toml()?;
        assert!(text.contains("[config.runtime]"));
        assert!(text.contains("[config.verify]"));
        assert!(text.contains("lastmodtime = true"));
        assert!(text.contains("dir/b.txt"));
        assert!(text.contains("perm = 420"));

        let parsed = Roster::from_toml(&text)?;
        assert_eq!(parsed.config, roster.config);
        assert_eq!(parsed.index.to_sorted(), roster.index.to_sorted());
        Ok(())
    }

    #[test]
    fn test_invalid_pattern_fails_to_load() {
        let result = Roster::from_toml(
            r#"
            [config]
            ignore = ["(unclosed"]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".roster.toml");

        let roster = Roster::load(&path)?;
        assert!(roster.index.is_empty());
        assert_eq!(roster.config.verify, ComparisonPolicy::all());
        assert!(!path.exists(), "read-only load must not create the file");
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join(".roster.toml");
        let err = Roster::load(&path).unwrap_err();
        assert!(err.to_string().contains("Directory not found"));
    }

    #[test]
    fn test_non_regular_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".roster.toml");
        fs::create_dir(&path)?;
        let err = Roster::load(&path).unwrap_err();
        assert!(err.to_string().contains("Not a regular file"));
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".roster.toml");

        let mut roster = Roster::default();
        roster.config.runtime.threads = 3;
        roster.index.insert(
            "a.txt".into(),
            AttributeSnapshot::new(Some(1), None, None, Some("00ff".into())),
        );
        roster.save(&path)?;

        // Shorter content must not leave stale bytes behind
        let smaller = Roster::default();
        smaller.save(&path)?;
        let reloaded = Roster::load(&path)?;
        assert!(reloaded.index.is_empty());

        roster.save(&path)?;
        let reloaded = Roster::load(&path)?;
        assert_eq!(reloaded.config.runtime.threads, 3);
        assert_eq!(reloaded.index.to_sorted(), roster.index.to_sorted());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_new_roster_file_is_private() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let path = dir.path().join(".roster.toml");
        Roster::default().save(&path)?;

        let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
        assert_eq!(mode & 0o077, 0);
        Ok(())
    }

    #[test]
    fn test_read_only_handle_refuses_save() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".roster.toml");
        Roster::default().save(&path)?;

        let mut handle = RosterFile::open(&path, Access::ReadOnly)?;
        assert!(handle.save(&Roster::default()).is_err());
        Ok(())
    }

    #[test]
    fn test_unsaved_new_roster_is_removed_on_drop() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(".roster.toml");

        let mut handle = RosterFile::open(&path, Access::ReadWrite)?;
        assert!(handle.load()?.index.is_empty());
        assert!(path.exists());
        drop(handle);
        assert!(!path.exists());

        Roster::default().save(&path)?;
        drop(RosterFile::open(&path, Access::ReadWrite)?);
        assert!(path.exists(), "an existing roster must survive an unsaved handle");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_roster_is_followed() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("real.toml");
        let link = dir.path().join(".roster.toml");

        let roster = Roster::default();
        roster.index.insert(
            "a.txt".into(),
            AttributeSnapshot::new(Some(1), None, None, None),
        );
        roster.save(&target)?;
        std::os::unix::fs::symlink(&target, &link)?;

        let loaded = Roster::load(&link)?;
        assert!(loaded.index.contains("a.txt"));
        Ok(())
    }
}
