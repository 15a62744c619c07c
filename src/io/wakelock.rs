//! Time-bounded wake-lock via systemd-logind.
//!
//! Animation dispatch must not race device sleep: the dispatcher takes a
//! bounded wake-lock before queueing a command so the device stays awake
//! through the worst-case animation start latency. The lock is
//! self-expiring: a timer thread drops the logind inhibitor fd after the
//! requested duration, so a crashed or slow worker can never hold power
//! indefinitely.
//!
//! When the system D-Bus is unavailable glintd degrades gracefully to a
//! no-op lock and keeps running.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use zbus::blocking::Connection;
use zbus::zvariant::OwnedFd;

/// D-Bus proxy trait for the systemd-logind Manager interface.
#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
trait LogindManager {
    /// Take an inhibitor lock; the lock is held for the lifetime of the
    /// returned file descriptor.
    fn inhibit(&self, what: &str, who: &str, why: &str, mode: &str) -> zbus::Result<OwnedFd>;
}

/// Capability interface for a time-bounded, self-releasing wake-lock.
pub trait WakeLock: Send + Sync {
    /// Keep the device awake for up to `duration`. The lock expires on its
    /// own; there is no explicit release.
    fn acquire_for(&self, duration: Duration);
}

/// Wake-lock that takes a logind sleep inhibitor and drops it after the
/// requested duration.
pub struct LogindWakeLock {
    connection: Connection,
    debug_enabled: bool,
}

impl LogindWakeLock {
    pub fn new(debug_enabled: bool) -> Result<Self> {
        let connection =
            Connection::system().context("Failed to connect to the system D-Bus")?;

        // Probe the proxy once so setup failures surface here, not on the
        // first dispatch
        LogindManagerProxyBlocking::new(&connection)
            .context("Failed to create logind proxy")?;

        Ok(Self {
            connection,
            debug_enabled,
        })
    }
}

impl WakeLock for LogindWakeLock {
    fn acquire_for(&self, duration: Duration) {
        let proxy = match LogindManagerProxyBlocking::new(&self.connection) {
            Ok(proxy) => proxy,
            Err(e) => {
                if self.debug_enabled {
                    log_debug!("Wake-lock proxy unavailable: {e}");
                }
                return;
            }
        };

        match proxy.inhibit("sleep:idle", "glintd", "animation dispatch", "block") {
            Ok(fd) => {
                let debug_enabled = self.debug_enabled;
                thread::spawn(move || {
                    thread::sleep(duration);
                    // Dropping the fd releases the inhibitor
                    drop(fd);
                    if debug_enabled {
                        log_debug!("Wake-lock expired after {}ms", duration.as_millis());
                    }
                });
            }
            Err(e) => {
                if self.debug_enabled {
                    log_debug!("Failed to take wake-lock: {e}");
                }
            }
        }
    }
}

/// Wake-lock stand-in for environments without logind.
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire_for(&self, _duration: Duration) {}
}

/// Create the best available wake-lock.
///
/// Falls back to [`NoopWakeLock`] with a warning when logind is not
/// reachable; glintd keeps working, animations just race device sleep.
pub fn create_wake_lock(debug_enabled: bool) -> Arc<dyn WakeLock> {
    match LogindWakeLock::new(debug_enabled) {
        Ok(lock) => Arc::new(lock),
        Err(e) => {
            log_pipe!();
            log_warning!("Wake-lock unavailable: {e}");
            log_indented!("Animations may be cut short by device sleep");
            log_indented!("This is normal in environments without systemd-logind");
            Arc::new(NoopWakeLock)
        }
    }
}
