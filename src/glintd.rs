//! Application coordinator that manages the complete lifecycle of glintd.
//!
//! This module handles resource acquisition, initialization, and
//! orchestration of the core logic:
//! - Configuration loading
//! - Lock file management for single-instance enforcement
//! - Signal handler setup
//! - Config watcher, wake-lock, animation sink, and system feed startup
//! - The core event loop and graceful shutdown
//!
//! The `Glintd` struct uses a builder pattern to support different startup
//! contexts:
//! - Normal startup: `Glintd::new(debug_enabled).run()`
//! - Embedded/test startup: `Glintd::new(true).without_lock().without_headers().run()`

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::channel;

use crate::{
    audio::SystemRinger,
    config::Config,
    core::{Core, CoreParams, dispatch::Dispatcher},
    io::feed::SystemFeed,
    io::lock::acquire_lock,
    io::signals::setup_signal_handler,
    io::wakelock::create_wake_lock,
    sink::{create_sink, detect_sink},
};

/// Builder for configuring and running the glintd service.
pub struct Glintd {
    debug_enabled: bool,
    create_lock: bool,
    show_headers: bool,
}

impl Glintd {
    /// Create a new runner with defaults matching a normal run.
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
            show_headers: true,
        }
    }

    /// Skip lock file creation (embedded or test contexts).
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Skip the version header.
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Execute the service with the configured settings.
    ///
    /// Acquires all resources in dependency order, then hands control to
    /// the core event loop until shutdown.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        // Load and validate configuration first
        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{e:?}");
                std::process::exit(1);
            }
        };

        // Lock file BEFORE spawning any watcher threads
        let _lock = if self.create_lock {
            let lock = acquire_lock()?;
            log_block_start!("Lock acquired, starting glintd...");
            lock
        } else {
            None
        };

        // Every producer thread feeds this one channel
        let (event_sender, event_receiver) = channel();
        let running = Arc::new(AtomicBool::new(true));

        setup_signal_handler(event_sender.clone(), Arc::clone(&running), self.debug_enabled)?;

        // Config hot reload (optional - graceful degradation if unavailable)
        if let Err(e) = crate::config::start_config_watcher(event_sender.clone(), self.debug_enabled)
        {
            log_pipe!();
            log_warning!("Config file watching unavailable: {e}");
            log_indented!("Hot config reload disabled, use SIGUSR2 for manual reload");
        }

        let sink_type = detect_sink(&config);
        config.log_config(Some(sink_type));

        log_block_start!("Using {} animation sink", sink_type.name());
        let sink = create_sink(sink_type, &config, self.debug_enabled)?;

        let wake_lock = create_wake_lock(self.debug_enabled);
        let dispatcher = Dispatcher::new(sink, wake_lock);

        // System feed delivers sensor and notification events
        let source = SystemFeed::spawn(
            event_sender.clone(),
            Arc::clone(&running),
            self.debug_enabled,
        )
        .context("Failed to start the system event feed")?;
        log_decorated!(
            "System feed ready: {}",
            crate::common::private_path(&crate::io::feed::feed_socket_path())
        );

        let core = Core::new(CoreParams {
            config,
            dispatcher,
            ringer: Box::new(SystemRinger::new()),
            source: Box::new(source),
            events: event_receiver,
            running,
            debug_enabled: self.debug_enabled,
        });

        core.execute()?;

        log_block_start!("Shutting down glintd...");
        log_end!();
        Ok(())
    }
}
