use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{Level, span, trace};
use xxhash_rust::xxh3::Xxh3;

/// Read buffer used while streaming file content into the hasher.
const CHUNK_SIZE: usize = 64 * 1024;

/// Formats a 64-bit digest the way it is stored in the roster file.
#[must_use]
pub fn format_digest(digest: u64) -> String {
    format!("{digest:016x}")
}

/// Computes the XXH3-64 checksum of a file by streaming its content.
///
/// The file is never loaded whole; memory use is bounded by [`CHUNK_SIZE`]
/// regardless of file size.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a read fails midway.
pub fn hash_file_streaming(path: &Path) -> Result<String> {
    let span = span!(Level::TRACE, "checksum", path = %path.display());
    let _guard = span.enter();

    let mut file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut hasher = Xxh3::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    trace!(bytes = total, "checksum complete");
    Ok(format_digest(hasher.digest()))
}
