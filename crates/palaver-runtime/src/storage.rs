//! Persistence of the engine's opaque state blob
//!
//! The blob is bytes in, bytes out; its format belongs to the engine. The
//! one hard requirement is atomicity: a reader must only ever see the
//! previous complete blob or the new complete blob. Saves therefore write
//! to a staging file in the same directory and rename it into place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use palaver_core::Result;

// ----------------------------------------------------------------------------
// Load
// ----------------------------------------------------------------------------

/// Read the saved state blob. A missing file is a fresh session, not an
/// error.
pub fn load(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(blob) => {
            debug!(path = %path.display(), len = blob.len(), "loaded engine state");
            Ok(Some(blob))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no saved engine state, starting fresh");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

// ----------------------------------------------------------------------------
// Save
// ----------------------------------------------------------------------------

/// Write the state blob atomically, creating the parent directory if
/// needed. An empty blob is skipped and any existing file left untouched.
pub fn save(path: &Path, blob: &[u8]) -> Result<()> {
    if blob.is_empty() {
        debug!(path = %path.display(), "engine state is empty, skipping save");
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let staging = staging_path(path);
    fs::write(&staging, blob)?;
    fs::rename(&staging, path)?;
    debug!(path = %path.display(), len = blob.len(), "saved engine state");
    Ok(())
}

/// Staging file beside the target, so the final rename never crosses a
/// filesystem boundary.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
