use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a `td` command waits for another one to finish.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive hold on a data directory for one read-modify-write command.
///
/// Taken before the list is loaded and dropped after the write is applied, so
/// two `td` processes never interleave their load and save. The lock file is
/// left in place: every process must flock the same inode.
#[derive(Debug)]
pub struct DataDirLock {
    // flock is released when this handle closes
    _file: File,
}

/// Error type for taking the data-directory lock
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not lock {path}: {source}")]
    Flock {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is still locked after {waited:?}: another td command is running")]
    Busy { path: PathBuf, waited: Duration },
}

/// Path of the lock file inside `data_dir`.
pub fn lock_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".lock")
}

impl DataDirLock {
    /// Lock `data_dir`, polling for up to `wait` while another process holds it.
    pub fn acquire(data_dir: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = lock_path(data_dir);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + wait;
        loop {
            match try_lock_exclusive(&file) {
                Ok(true) => return Ok(DataDirLock { _file: file }),
                Ok(false) if Instant::now() < deadline => std::thread::sleep(POLL_INTERVAL),
                Ok(false) => return Err(LockError::Busy { path, waited: wait }),
                Err(source) => return Err(LockError::Flock { path, source }),
            }
        }
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_WAIT)
    }
}

/// Non-blocking exclusive flock. `Ok(false)` when someone else holds it.
#[cfg(unix)]
fn try_lock_exclusive(file: &File) -> std::io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_lock_exclusive(_file: &File) -> std::io::Result<bool> {
    Ok(true)
}
