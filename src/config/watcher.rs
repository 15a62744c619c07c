//! File watching module for hot config reloading.
//!
//! Monitors the configuration file and sends a reload event to the core
//! when it changes, so settings edits apply without a manual SIGUSR2.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::constants::{CONFIG_DEBOUNCE_MS, CONFIG_FILE_NAME};
use crate::events::ServiceEvent;

/// Configuration file watcher that triggers reloads on changes.
pub struct ConfigWatcher {
    event_sender: Sender<ServiceEvent>,
    debug_enabled: bool,
}

impl ConfigWatcher {
    pub fn new(event_sender: Sender<ServiceEvent>, debug_enabled: bool) -> Self {
        Self {
            event_sender,
            debug_enabled,
        }
    }

    /// Start watching the configuration file for changes.
    ///
    /// Spawns a background thread that monitors the config directory and
    /// sends `ServiceEvent::Reload` when the config file is written.
    pub fn start(self) -> Result<()> {
        let config_path = crate::config::get_config_path()?;
        if !config_path.exists() {
            if self.debug_enabled {
                log_pipe!();
                log_debug!("No configuration file found to watch for hot reload");
            }
            return Ok(());
        }

        if self.debug_enabled {
            log_pipe!();
            log_debug!(
                "Watching for config changes: {}",
                crate::common::private_path(&config_path)
            );
        }

        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    // Only care about write/create/remove events
                    match event.kind {
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                            let _ = tx.send(event);
                        }
                        _ => {}
                    }
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        // Watch the parent directory rather than the file itself; editors
        // replace files on save and direct watches go stale
        let watch_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;
        watcher
            .watch(watch_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", watch_dir.display()))?;

        let event_sender = self.event_sender;
        let debug_enabled = self.debug_enabled;

        thread::spawn(move || {
            // Keep the watcher alive by moving it into the thread
            let _watcher = watcher;
            let mut last_reload = std::time::Instant::now();

            for event in rx {
                let affects_config = event.paths.iter().any(|path| {
                    path.file_name()
                        .and_then(|name| name.to_str())
                        .map(|name| name == CONFIG_FILE_NAME || name.ends_with(CONFIG_FILE_NAME))
                        .unwrap_or(false)
                });
                if !affects_config {
                    continue;
                }

                // Debounce: editors write files in multiple steps
                if last_reload.elapsed() < Duration::from_millis(CONFIG_DEBOUNCE_MS) {
                    continue;
                }

                if debug_enabled {
                    log_pipe!();
                    log_info!("Configuration file change detected");
                }

                match event_sender.send(ServiceEvent::Reload) {
                    Ok(()) => {
                        last_reload = std::time::Instant::now();
                    }
                    Err(_) => {
                        // Core channel gone, exit thread
                        break;
                    }
                }
            }
        });

        Ok(())
    }
}

/// Start the configuration file watcher.
pub fn start_config_watcher(
    event_sender: Sender<ServiceEvent>,
    debug_enabled: bool,
) -> Result<()> {
    ConfigWatcher::new(event_sender, debug_enabled).start()
}
