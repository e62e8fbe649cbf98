//! The single staging directory shared by all repositories in a run.
//!
//! Reset-before and reset-after is the only isolation mechanism between
//! repositories: the directory never simultaneously holds artifacts from two
//! of them.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Recursively remove `path` if present, then recreate it empty.
///
/// Idempotent; an absent directory is not an error.
pub fn reset(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(path)?;
    debug!(path = %path.display(), "workspace reset");
    Ok(())
}
