//! Small shared utilities.

use std::path::Path;

/// Check whether a process with the given PID is still alive.
///
/// Sends signal 0, which performs permission and existence checks without
/// delivering anything.
pub fn is_process_running(pid: u32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
}

/// Replace the home directory prefix with `~` for log output.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Resolve the per-user runtime directory, falling back to `/run/user/{uid}`
/// when `XDG_RUNTIME_DIR` is unset.
pub fn runtime_dir() -> std::path::PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        std::path::PathBuf::from(dir)
    } else {
        std::path::PathBuf::from(format!("/run/user/{}", nix::unistd::getuid()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_is_running() {
        assert!(is_process_running(std::process::id()));
    }

    #[test]
    fn dead_pid_is_not_running() {
        // PIDs near the 32-bit max are never handed out on default kernels
        assert!(!is_process_running(0x7fff_fff0));
    }
}
