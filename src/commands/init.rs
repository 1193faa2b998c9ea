use crate::output;
use crate::storage::{Access, Roster, RosterFile};
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Write a default roster file into every directory.
///
/// # Errors
///
/// Returns an error naming how many directories failed; each failure is
/// printed as it happens.
pub fn execute(dirs: &[PathBuf], file: &str, force: bool) -> Result<()> {
    let mut failed = 0usize;

    for dir in dirs {
        match init_directory(dir, file, force) {
            Ok(path) => output::success(&format!("Initialized roster at {}", path.display())),
            Err(e) => {
                failed += 1;
                output::error(&format!("{}: {e:#}", dir.display()));
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} directories could not be initialized", dirs.len());
    }
    Ok(())
}

/// Write the default roster for `dir` and return its path.
///
/// # Errors
///
/// Returns an error if:
/// - A roster already exists and `force` is not set
/// - The directory is missing or the file cannot be written
pub fn init_directory(dir: &Path, file: &str, force: bool) -> Result<PathBuf> {
    let path = dir.join(file);
    if path.exists() && !force {
        bail!(
            "Roster already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    let mut handle = RosterFile::open(&path, Access::ReadWrite)?;
    handle.save(&Roster::default())?;
    Ok(path)
}
