//! Exclusive run lock.
//!
//! At most one reconciliation run may be active system-wide; concurrent runs
//! racing on the same mapping rows would double-create or double-delete
//! events. The lock is released when the guard drops.

use std::fs::{self, File};
use std::path::PathBuf;

use fs2::FileExt;

use crate::error::CoreError;

/// Holds the exclusive lock for the duration of one run.
pub struct RunLock {
    _file: File,
}

fn lock_path() -> Result<PathBuf, CoreError> {
    let base = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| CoreError::Custom("could not determine runtime directory".to_string()))?;

    let dir = base.join("remcal");
    fs::create_dir_all(&dir)?;
    Ok(dir.join("sync.lock"))
}

/// Acquire the run lock, failing fast if another sync is in flight.
///
/// # Errors
/// Returns an error if the lock file cannot be created or another process
/// already holds the lock.
pub fn acquire() -> Result<RunLock, CoreError> {
    let path = lock_path()?;
    let file = File::create(&path)?;

    file.try_lock_exclusive().map_err(|_| {
        CoreError::Custom(format!(
            "another sync run is already active; refusing to start.\n\
             If you believe this is an error, remove: {}",
            path.display()
        ))
    })?;

    Ok(RunLock { _file: file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_is_exclusive_until_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.lock");

        let first = File::create(&path).unwrap();
        first.try_lock_exclusive().unwrap();

        let second = File::create(&path).unwrap();
        assert!(second.try_lock_exclusive().is_err());

        fs2::FileExt::unlock(&first).unwrap();
        assert!(second.try_lock_exclusive().is_ok());
    }
}
