//! Lock file management for single-instance enforcement.
//!
//! Only one glintd instance may run per user: two instances would race on
//! the ringer side effect and double-drive the animation sink. The lock file
//! lives in the runtime directory and records the owning PID plus the config
//! directory in use, which lets a second invocation distinguish a live
//! instance from a stale lock.

use anyhow::Result;
use fs2::FileExt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common;
use crate::config;
use crate::constants::LOCK_FILE_NAME;

/// Path of the single-instance lock file.
pub fn lock_path() -> PathBuf {
    common::runtime_dir().join(LOCK_FILE_NAME)
}

/// Acquire an exclusive lock on the lock file.
///
/// # Returns
/// - `Ok(Some((lock_file, lock_path)))` if the lock was acquired
/// - Never returns `Ok(None)`; a live conflicting instance exits the process
///   with a helpful message
pub fn acquire_lock() -> Result<Option<(File, PathBuf)>> {
    let path = lock_path();

    // Open without truncating to preserve existing content for conflict
    // inspection
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)?;

    match lock_file.try_lock_exclusive() {
        Ok(()) => {
            write_lock_info(lock_file, path).map(Some)
        }
        Err(_) => {
            // Another instance may be running; resolve stale locks and retry
            handle_lock_conflict(&path)?;

            let retry = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)?;

            match retry.try_lock_exclusive() {
                Ok(()) => write_lock_info(retry, path).map(Some),
                Err(e) => {
                    log_error_exit!("Failed to acquire lock after cleanup attempt: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Write our PID and config directory into a freshly locked file.
fn write_lock_info(mut lock_file: File, path: PathBuf) -> Result<(File, PathBuf)> {
    lock_file.set_len(0)?;
    lock_file.seek(SeekFrom::Start(0))?;

    writeln!(&lock_file, "{}", std::process::id())?;
    // Config directory (empty line when using the default)
    if let Some(dir) = config::get_custom_config_dir() {
        writeln!(&lock_file, "{}", dir.display())?;
    } else {
        writeln!(&lock_file)?;
    }
    lock_file.flush()?;

    Ok((lock_file, path))
}

/// Handle lock file conflicts.
///
/// Removes stale lock files (owning process no longer running) and returns;
/// exits the process when a live instance holds the lock.
fn handle_lock_conflict(path: &Path) -> Result<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            // Lock file vanished between the failed lock and now
            return Ok(());
        }
    };

    let lines: Vec<&str> = content.trim().lines().collect();

    // Lock file format: PID (line 1), config dir (line 2, optional)
    if lines.is_empty() || lines.len() > 2 {
        log_warning!("Lock file format invalid, removing");
        let _ = std::fs::remove_file(path);
        return Ok(());
    }

    let pid = match lines[0].parse::<u32>() {
        Ok(pid) => pid,
        Err(_) => {
            log_warning!("Lock file contains invalid PID, removing stale lock");
            let _ = std::fs::remove_file(path);
            return Ok(());
        }
    };

    if !common::is_process_running(pid) {
        log_warning!("Removing stale lock file (process {pid} no longer running)");
        let _ = std::fs::remove_file(path);
        return Ok(());
    }

    log_pipe!();
    log_error!("glintd is already running (PID: {pid})");
    log_block_start!("Did you mean to:");
    log_indented!("• Reload configuration: kill -USR2 {pid}");
    log_indented!("• Stop the running instance: kill {pid}");
    log_end!();
    std::process::exit(1)
}
