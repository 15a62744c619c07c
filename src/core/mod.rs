//! Core event loop and state management.
//!
//! This module encapsulates the decision core of glintd: one thread owning
//! the flip monitor and the notification policy engine, consuming every
//! inbound `ServiceEvent` in arrival order. It handles:
//!
//! - Flip edges (debounced mute/animate side effect)
//! - Notification posted/removed events (policy evaluation)
//! - Settings changes and configuration hot-reloads
//! - Shutdown with unconditional essential-animation teardown
//!
//! Because the loop is single-threaded, the flip state and the essential
//! state each have exactly one writer; the dispatcher's queue is the only
//! structure touched by multiple producers.

pub mod dispatch;
pub mod flip;
pub mod policy;

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};

use crate::audio::RingerControl;
use crate::config::Config;
use crate::constants::{EVENT_POLL_INTERVAL, SETTING_ESSENTIAL_APPS};
use crate::core::dispatch::Dispatcher;
use crate::core::flip::FlipMonitor;
use crate::core::policy::PolicyEngine;
use crate::events::ServiceEvent;
use crate::notifications::NotificationSource;

/// Parameters for creating a Core instance.
///
/// Bundles the dependencies so construction sites stay readable.
pub struct CoreParams {
    pub config: Config,
    pub dispatcher: Dispatcher,
    pub ringer: Box<dyn RingerControl>,
    pub source: Box<dyn NotificationSource>,
    pub events: Receiver<ServiceEvent>,
    pub running: Arc<AtomicBool>,
    pub debug_enabled: bool,
}

/// The decision core: owns all runtime state and the main loop.
pub struct Core {
    config: Config,
    dispatcher: Dispatcher,
    ringer: Box<dyn RingerControl>,
    source: Box<dyn NotificationSource>,
    events: Receiver<ServiceEvent>,
    running: Arc<AtomicBool>,
    debug_enabled: bool,
    flip: FlipMonitor,
    policy: PolicyEngine,
}

impl Core {
    pub fn new(params: CoreParams) -> Self {
        let debug_enabled = params.debug_enabled;
        Self {
            config: params.config,
            dispatcher: params.dispatcher,
            ringer: params.ringer,
            source: params.source,
            events: params.events,
            running: params.running,
            debug_enabled,
            flip: FlipMonitor::new(debug_enabled),
            policy: PolicyEngine::new(debug_enabled),
        }
    }

    /// Run the core loop until shutdown.
    pub fn execute(mut self) -> Result<()> {
        // Service start: derive the essential state from whatever is
        // already active before the first event arrives
        self.policy
            .reevaluate_essential(&self.config, self.source.as_ref(), &self.dispatcher);

        loop {
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            match self.events.recv_timeout(EVENT_POLL_INTERVAL) {
                Ok(event) => {
                    if !self.handle_event(event) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.teardown();
        Ok(())
    }

    /// Process one event. Returns false on shutdown.
    fn handle_event(&mut self, event: ServiceEvent) -> bool {
        match event {
            ServiceEvent::Flip(flipped) => {
                if self.config.is_enabled() && self.config.is_flip_enabled() {
                    self.flip
                        .on_sensor_event(flipped, self.ringer.as_ref(), &self.dispatcher);
                }
            }
            ServiceEvent::NotificationPosted(notification) => {
                self.policy.on_notification_posted(
                    &notification,
                    &self.config,
                    self.source.as_ref(),
                    &self.dispatcher,
                );
            }
            ServiceEvent::NotificationRemoved {
                package,
                channel_id,
            } => {
                self.policy.on_notification_removed(
                    &package,
                    &channel_id,
                    &self.config,
                    self.source.as_ref(),
                    &self.dispatcher,
                );
            }
            ServiceEvent::SettingsChanged(key) => {
                self.policy.on_settings_changed(
                    &key,
                    &self.config,
                    self.source.as_ref(),
                    &self.dispatcher,
                );
            }
            ServiceEvent::Reload => self.reload_config(),
            ServiceEvent::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
                return false;
            }
        }
        true
    }

    /// Replace the configuration from disk, keeping the old one when the
    /// new one fails to load or validate.
    fn reload_config(&mut self) {
        let new_config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                log_pipe!();
                log_warning!("Config reload failed, keeping current configuration");
                log_indented!("{e:#}");
                return;
            }
        };

        if new_config == self.config {
            if self.debug_enabled {
                log_debug!("Config unchanged after reload");
            }
            return;
        }

        log_block_start!("Configuration reloaded");
        let policy_changed = self.config.notification_policy_changed(&new_config);
        let essential_changed = self.config.essential_apps_changed(&new_config);
        self.config = new_config;

        // Settings-observer semantics: the essential-apps key goes through
        // the engine's settings path; any other policy-relevant change
        // reevaluates directly
        if essential_changed {
            self.policy.on_settings_changed(
                SETTING_ESSENTIAL_APPS,
                &self.config,
                self.source.as_ref(),
                &self.dispatcher,
            );
        } else if policy_changed {
            self.policy
                .reevaluate_essential(&self.config, self.source.as_ref(), &self.dispatcher);
        }
    }

    /// Service stop: the essential animation is stopped unconditionally
    /// through the direct path (idempotent at the sink), then the dispatch
    /// worker drains and exits.
    fn teardown(self) {
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Stopping core loop");
        }
        self.dispatcher.stop_essential_now();
        // Dropping self joins the dispatch worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockRingerControl;
    use crate::core::dispatch::test_support::RecordingSink;
    use crate::io::wakelock::NoopWakeLock;
    use crate::notifications::{ChannelInfo, InterruptionFilter, Notification};
    use std::sync::mpsc;

    struct GrantedEmptySource;

    impl NotificationSource for GrantedEmptySource {
        fn active(&self) -> Vec<Notification> {
            Vec::new()
        }
        fn channel_info(&self, _p: &str, _c: &str) -> Option<ChannelInfo> {
            None
        }
        fn interruption_filter(&self) -> InterruptionFilter {
            InterruptionFilter::All
        }
        fn policy_access_granted(&self) -> bool {
            true
        }
    }

    #[test]
    fn startup_evaluates_and_teardown_stops_essential() {
        let (sink, log) = RecordingSink::new();
        let dispatcher = Dispatcher::new(Box::new(sink), Arc::new(NoopWakeLock));
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));

        let core = Core::new(CoreParams {
            config: Config::default(),
            dispatcher,
            ringer: Box::new(MockRingerControl::new()),
            source: Box::new(GrantedEmptySource),
            events: rx,
            running,
            debug_enabled: false,
        });

        tx.send(ServiceEvent::Shutdown).unwrap();
        core.execute().unwrap();

        // Startup reevaluation (empty set → stop) and the unconditional
        // teardown stop, both idempotent at the sink
        assert_eq!(*log.lock().unwrap(), vec!["essential stop"; 2]);
    }

    #[test]
    fn flip_events_respect_feature_flags() {
        let (sink, log) = RecordingSink::new();
        let dispatcher = Dispatcher::new(Box::new(sink), Arc::new(NoopWakeLock));
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));

        let config = Config {
            flip_enabled: Some(false),
            ..Config::default()
        };
        // Ringer must never be touched with the flip feature off
        let ringer = MockRingerControl::new();

        let core = Core::new(CoreParams {
            config,
            dispatcher,
            ringer: Box::new(ringer),
            source: Box::new(GrantedEmptySource),
            events: rx,
            running,
            debug_enabled: false,
        });

        tx.send(ServiceEvent::Flip(true)).unwrap();
        tx.send(ServiceEvent::Shutdown).unwrap();
        core.execute().unwrap();

        let log = log.lock().unwrap();
        assert!(!log.iter().any(|line| line == "play flip"));
    }
}
