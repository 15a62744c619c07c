//! Signal handling for glintd.
//!
//! Translates POSIX signals into `ServiceEvent`s on the core channel:
//! SIGTERM/SIGINT/SIGHUP request shutdown, SIGUSR2 requests a configuration
//! reload. The handler also flips the shared `running` flag directly so
//! worker threads that poll it stop even if the core loop is busy.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::Sender,
};
use std::thread;

use crate::events::ServiceEvent;

/// Install the signal handling thread.
///
/// The thread lives for the whole process; once `running` is cleared any
/// further signals still deliver Shutdown events, which the drained channel
/// simply discards.
pub fn setup_signal_handler(
    event_sender: Sender<ServiceEvent>,
    running: Arc<AtomicBool>,
    debug_enabled: bool,
) -> Result<()> {
    let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP, SIGUSR2])
        .context("Failed to install signal handlers")?;

    thread::spawn(move || {
        for signal in signals.forever() {
            match signal {
                SIGTERM | SIGINT | SIGHUP => {
                    if debug_enabled {
                        log_pipe!();
                        log_debug!("Received shutdown signal ({signal})");
                    }
                    running.store(false, Ordering::SeqCst);
                    if event_sender.send(ServiceEvent::Shutdown).is_err() {
                        break;
                    }
                }
                SIGUSR2 => {
                    if debug_enabled {
                        log_pipe!();
                        log_debug!("Received reload signal (SIGUSR2)");
                    }
                    if event_sender.send(ServiceEvent::Reload).is_err() {
                        break;
                    }
                }
                _ => {}
            }
        }
    });

    Ok(())
}
