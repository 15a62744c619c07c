//! Shared fakes for integration tests.

#![allow(dead_code)]

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use glintd::audio::{RingerControl, RingerMode};
use glintd::config::Config;
use glintd::io::wakelock::WakeLock;
use glintd::notifications::{ChannelInfo, InterruptionFilter, Notification, NotificationSource};
use glintd::sink::AnimationSink;

/// Sink that records every command into a shared log.
pub struct RecordingSink {
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl AnimationSink for RecordingSink {
    fn play(&mut self, animation: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("play {animation}"));
        Ok(())
    }
    fn play_essential(&mut self) -> Result<()> {
        self.log.lock().unwrap().push("essential start".into());
        Ok(())
    }
    fn stop_essential(&mut self) -> Result<()> {
        self.log.lock().unwrap().push("essential stop".into());
        Ok(())
    }
    fn sink_name(&self) -> &'static str {
        "Recording"
    }
}

/// Wake-lock that records requested durations.
pub struct CountingWakeLock {
    acquisitions: Arc<Mutex<Vec<Duration>>>,
}

impl CountingWakeLock {
    pub fn new() -> (Self, Arc<Mutex<Vec<Duration>>>) {
        let acquisitions = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                acquisitions: Arc::clone(&acquisitions),
            },
            acquisitions,
        )
    }
}

impl WakeLock for CountingWakeLock {
    fn acquire_for(&self, duration: Duration) {
        self.acquisitions.lock().unwrap().push(duration);
    }
}

/// Mutable in-memory notification source: tests adjust it between
/// evaluation passes the way the OS would.
#[derive(Default)]
pub struct FakeSource {
    pub active: Mutex<Vec<Notification>>,
    pub channels: Mutex<Vec<((String, String), ChannelInfo)>>,
    pub filter: Mutex<InterruptionFilter>,
    pub access: Mutex<bool>,
}

impl FakeSource {
    pub fn granted() -> Self {
        let source = Self::default();
        *source.access.lock().unwrap() = true;
        source
    }

    pub fn post(&self, package: &str, channel_id: &str, is_ongoing: bool) -> Notification {
        let notification = Notification {
            package: package.into(),
            channel_id: channel_id.into(),
            is_ongoing,
        };
        self.active.lock().unwrap().push(notification.clone());
        notification
    }

    pub fn remove(&self, package: &str, channel_id: &str) {
        self.active
            .lock()
            .unwrap()
            .retain(|n| !(n.package == package && n.channel_id == channel_id));
    }

    pub fn set_channel(&self, package: &str, channel_id: &str, importance: i32, bypass: bool) {
        self.channels.lock().unwrap().push((
            (package.into(), channel_id.into()),
            ChannelInfo {
                importance,
                can_bypass_dnd: bypass,
            },
        ));
    }

    pub fn set_filter(&self, filter: InterruptionFilter) {
        *self.filter.lock().unwrap() = filter;
    }

    pub fn set_access(&self, granted: bool) {
        *self.access.lock().unwrap() = granted;
    }
}

impl NotificationSource for FakeSource {
    fn active(&self) -> Vec<Notification> {
        self.active.lock().unwrap().clone()
    }
    fn channel_info(&self, package: &str, channel_id: &str) -> Option<ChannelInfo> {
        self.channels
            .lock()
            .unwrap()
            .iter()
            .find(|((p, c), _)| p == package && c == channel_id)
            .map(|(_, info)| *info)
    }
    fn interruption_filter(&self) -> InterruptionFilter {
        *self.filter.lock().unwrap()
    }
    fn policy_access_granted(&self) -> bool {
        *self.access.lock().unwrap()
    }
}

/// Ringer with a live mode that external actors (and restores) mutate.
pub struct FakeRinger {
    pub live: Mutex<RingerMode>,
    pub set_calls: Mutex<Vec<RingerMode>>,
}

impl FakeRinger {
    pub fn new(initial: RingerMode) -> Self {
        Self {
            live: Mutex::new(initial),
            set_calls: Mutex::new(Vec::new()),
        }
    }

    /// Simulate an external ringer change behind glintd's back.
    pub fn external_change(&self, mode: RingerMode) {
        *self.live.lock().unwrap() = mode;
    }
}

impl RingerControl for FakeRinger {
    fn mode(&self) -> Result<RingerMode> {
        Ok(*self.live.lock().unwrap())
    }
    fn set_mode(&self, mode: RingerMode) -> Result<()> {
        *self.live.lock().unwrap() = mode;
        self.set_calls.lock().unwrap().push(mode);
        Ok(())
    }
}

/// A config with the notification feature fully on for one enabled app and
/// one essential app.
pub fn test_config() -> Config {
    Config {
        enabled: Some(true),
        flip_enabled: Some(true),
        notifs_enabled: Some(true),
        notifs_animation: Some("pulse".into()),
        notif_apps: Some(vec!["org.example.mail".into()]),
        essential_apps: Some(vec!["org.example.pager".into()]),
        ignored_apps: Some(vec!["org.example.spam".into()]),
        ignored_channels: Some(vec!["org.example.mail:promo".into()]),
        sink: None,
        sink_pipe: None,
    }
}
