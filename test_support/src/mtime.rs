//! Modification time control.
//!
//! Files written in quick succession often share a timestamp, so tests pin
//! times explicitly instead of sleeping.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Set the modification time of the file at `path`.
///
/// # Errors
///
/// Returns an [`io::Error`] if the file cannot be opened or updated.
pub fn set_mtime(path: impl AsRef<Path>, time: SystemTime) -> io::Result<()> {
    File::options()
        .write(true)
        .open(path.as_ref())?
        .set_modified(time)
}

/// Set the modification time of `path` to `secs` seconds after a fixed base
/// in the past. Larger values are newer.
///
/// # Errors
///
/// Returns an [`io::Error`] if the file cannot be opened or updated.
pub fn shift_mtime(path: impl AsRef<Path>, secs: u64) -> io::Result<()> {
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    set_mtime(path, base + Duration::from_secs(secs))
}
