//! System event feed over a Unix domain socket.
//!
//! The platform integration (sensor driver, notification listener) connects
//! to `$XDG_RUNTIME_DIR/glintd.sock` and streams newline-delimited JSON
//! messages:
//!
//! ```json
//! {"type":"flip","flipped":true}
//! {"type":"notification_posted","package":"org.example.mail","channel":"inbox","ongoing":false}
//! {"type":"notification_removed","package":"org.example.mail","channel":"inbox"}
//! {"type":"channel_info","package":"org.example.mail","channel":"inbox","importance":3,"bypass_dnd":false}
//! {"type":"interruption_filter","filter":"priority"}
//! {"type":"policy_access","granted":true}
//! {"type":"settings_changed","key":"essential_apps"}
//! ```
//!
//! The feed is the OS proxy: it owns the active-notification set, the
//! channel-metadata table, the interruption-filter level, and the
//! policy-access flag, and exposes them to the core through
//! [`NotificationSource`]. The core itself never caches any of this across
//! evaluations.
//!
//! Flip and notification messages additionally produce `ServiceEvent`s on
//! the core channel; metadata messages only update state, which the next
//! evaluation pass snapshots.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::constants::FEED_SOCKET_NAME;
use crate::events::ServiceEvent;
use crate::notifications::{ChannelInfo, InterruptionFilter, Notification, NotificationSource};

/// One message on the feed wire.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FeedMessage {
    Flip {
        flipped: bool,
    },
    NotificationPosted {
        package: String,
        #[serde(default)]
        channel: String,
        #[serde(default)]
        ongoing: bool,
    },
    NotificationRemoved {
        package: String,
        #[serde(default)]
        channel: String,
    },
    ChannelInfo {
        package: String,
        channel: String,
        importance: i32,
        #[serde(default)]
        bypass_dnd: bool,
    },
    InterruptionFilter {
        filter: InterruptionFilter,
    },
    PolicyAccess {
        granted: bool,
    },
    SettingsChanged {
        key: String,
    },
}

#[derive(Default)]
struct FeedState {
    /// Active notifications keyed by (package, channel).
    active: HashMap<(String, String), Notification>,
    /// Last-reported channel metadata.
    channels: HashMap<(String, String), ChannelInfo>,
    interruption_filter: InterruptionFilter,
    /// Not granted until the platform says so.
    policy_access_granted: bool,
}

/// Shared, queryable view of the feed state. Cheap to clone; all clones see
/// the same underlying state.
#[derive(Clone, Default)]
pub struct SystemState {
    inner: Arc<Mutex<FeedState>>,
}

impl NotificationSource for SystemState {
    fn active(&self) -> Vec<Notification> {
        self.inner.lock().unwrap().active.values().cloned().collect()
    }

    fn channel_info(&self, package: &str, channel_id: &str) -> Option<ChannelInfo> {
        self.inner
            .lock()
            .unwrap()
            .channels
            .get(&(package.to_string(), channel_id.to_string()))
            .copied()
    }

    fn interruption_filter(&self) -> InterruptionFilter {
        self.inner.lock().unwrap().interruption_filter
    }

    fn policy_access_granted(&self) -> bool {
        self.inner.lock().unwrap().policy_access_granted
    }
}

/// A connected feed client.
struct ClientConnection {
    stream: UnixStream,
    buffer: Vec<u8>,
}

/// Unix socket server that ingests platform events.
pub struct SystemFeed {
    socket_path: PathBuf,
    listener: UnixListener,
    clients: HashMap<u32, ClientConnection>,
    next_client_id: u32,
    state: SystemState,
    event_sender: Sender<ServiceEvent>,
    debug_enabled: bool,
}

impl SystemFeed {
    /// Bind the feed socket and start the reader thread.
    ///
    /// Returns the shared state handle the core queries during evaluations.
    pub fn spawn(
        event_sender: Sender<ServiceEvent>,
        running: Arc<AtomicBool>,
        debug_enabled: bool,
    ) -> Result<SystemState> {
        let socket_path = feed_socket_path();
        let feed = Self::bind(socket_path, event_sender, debug_enabled)?;
        let state = feed.state.clone();

        thread::spawn(move || {
            if let Err(e) = feed.run(running) {
                log_pipe!();
                log_warning!("System feed stopped: {e}");
                log_indented!("Sensor and notification events will no longer be received");
            }
        });

        Ok(state)
    }

    fn bind(
        socket_path: PathBuf,
        event_sender: Sender<ServiceEvent>,
        debug_enabled: bool,
    ) -> Result<Self> {
        // Remove a leftover socket from a previous run
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)
                .with_context(|| format!("Failed to remove existing socket: {socket_path:?}"))?;
        }
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {parent:?}"))?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind feed socket: {socket_path:?}"))?;
        listener
            .set_nonblocking(true)
            .context("Failed to set feed socket to non-blocking mode")?;

        Ok(Self {
            socket_path,
            listener,
            clients: HashMap::new(),
            next_client_id: 1,
            state: SystemState::default(),
            event_sender,
            debug_enabled,
        })
    }

    /// Main feed loop: accept clients, drain their lines, prune the dead.
    fn run(mut self, running: Arc<AtomicBool>) -> Result<()> {
        if self.debug_enabled {
            log_debug!("System feed listening on {:?}", self.socket_path);
        }

        while running.load(Ordering::SeqCst) {
            self.accept();
            if !self.pump() {
                // Core channel closed; nothing left to deliver to
                break;
            }

            // Small delay to prevent busy-waiting
            thread::sleep(Duration::from_millis(10));
        }

        if self.debug_enabled {
            log_debug!("System feed shutting down");
        }
        self.cleanup()
    }

    /// Accept new client connections (non-blocking).
    fn accept(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, _addr)) => {
                    if stream.set_nonblocking(true).is_err() {
                        continue;
                    }
                    let client_id = self.next_client_id;
                    self.next_client_id += 1;
                    self.clients.insert(
                        client_id,
                        ClientConnection {
                            stream,
                            buffer: Vec::new(),
                        },
                    );
                    if self.debug_enabled {
                        log_debug!("Feed connections: {}", self.clients.len());
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    if self.debug_enabled {
                        log_debug!("Error accepting feed connection: {e}");
                    }
                    break;
                }
            }
        }
    }

    /// Read available data from every client and handle complete lines.
    ///
    /// Returns false once the core channel is gone.
    fn pump(&mut self) -> bool {
        let mut disconnected = Vec::new();
        let mut lines = Vec::new();

        for (client_id, client) in &mut self.clients {
            let mut chunk = [0u8; 4096];
            loop {
                match client.stream.read(&mut chunk) {
                    Ok(0) => {
                        // Graceful disconnect
                        disconnected.push(*client_id);
                        break;
                    }
                    Ok(n) => {
                        client.buffer.extend_from_slice(&chunk[..n]);
                        while let Some(pos) = client.buffer.iter().position(|&b| b == b'\n') {
                            let line: Vec<u8> = client.buffer.drain(..=pos).collect();
                            if let Ok(text) = std::str::from_utf8(&line[..line.len() - 1]) {
                                let trimmed = text.trim();
                                if !trimmed.is_empty() {
                                    lines.push(trimmed.to_string());
                                }
                            }
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                    Err(_) => {
                        disconnected.push(*client_id);
                        break;
                    }
                }
            }
        }

        for client_id in disconnected {
            self.clients.remove(&client_id);
            if self.debug_enabled {
                log_debug!("Feed client disconnected - connections: {}", self.clients.len());
            }
        }

        for line in lines {
            if !self.handle_line(&line) {
                return false;
            }
        }
        true
    }

    /// Parse and apply one feed line. Returns false when the core channel
    /// has closed.
    fn handle_line(&mut self, line: &str) -> bool {
        let message: FeedMessage = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                // Malformed events are skipped; the stream continues
                if self.debug_enabled {
                    log_debug!("Skipping malformed feed message: {e}");
                }
                return true;
            }
        };

        let event = {
            let mut state = self.state.inner.lock().unwrap();
            match message {
                FeedMessage::Flip { flipped } => Some(ServiceEvent::Flip(flipped)),
                FeedMessage::NotificationPosted {
                    package,
                    channel,
                    ongoing,
                } => {
                    let notification = Notification {
                        package: package.clone(),
                        channel_id: channel.clone(),
                        is_ongoing: ongoing,
                    };
                    state
                        .active
                        .insert((package, channel), notification.clone());
                    Some(ServiceEvent::NotificationPosted(notification))
                }
                FeedMessage::NotificationRemoved { package, channel } => {
                    state.active.remove(&(package.clone(), channel.clone()));
                    Some(ServiceEvent::NotificationRemoved {
                        package,
                        channel_id: channel,
                    })
                }
                FeedMessage::ChannelInfo {
                    package,
                    channel,
                    importance,
                    bypass_dnd,
                } => {
                    state.channels.insert(
                        (package, channel),
                        ChannelInfo {
                            importance,
                            can_bypass_dnd: bypass_dnd,
                        },
                    );
                    None
                }
                FeedMessage::InterruptionFilter { filter } => {
                    state.interruption_filter = filter;
                    None
                }
                FeedMessage::PolicyAccess { granted } => {
                    state.policy_access_granted = granted;
                    None
                }
                FeedMessage::SettingsChanged { key } => Some(ServiceEvent::SettingsChanged(key)),
            }
        };

        match event {
            Some(event) => self.event_sender.send(event).is_ok(),
            None => true,
        }
    }

    /// Remove the socket file on shutdown.
    fn cleanup(&self) -> Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)
                .with_context(|| format!("Failed to remove socket file: {:?}", self.socket_path))?;
        }
        Ok(())
    }
}

/// The feed socket path in the per-user runtime directory.
pub fn feed_socket_path() -> PathBuf {
    crate::common::runtime_dir().join(FEED_SOCKET_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn feed_with_channel(dir: &std::path::Path) -> (SystemFeed, mpsc::Receiver<ServiceEvent>) {
        let (tx, rx) = mpsc::channel();
        let feed = SystemFeed::bind(dir.join("feed.sock"), tx, false).unwrap();
        (feed, rx)
    }

    #[test]
    fn posted_message_updates_active_set_and_emits_event() {
        let dir = tempfile::tempdir().unwrap();
        let (mut feed, rx) = feed_with_channel(dir.path());
        let state = feed.state.clone();

        assert!(feed.handle_line(
            r#"{"type":"notification_posted","package":"org.example.mail","channel":"inbox"}"#
        ));

        assert_eq!(state.active().len(), 1);
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServiceEvent::NotificationPosted(n) if n.package == "org.example.mail"
        ));
    }

    #[test]
    fn removed_message_clears_active_entry() {
        let dir = tempfile::tempdir().unwrap();
        let (mut feed, _rx) = feed_with_channel(dir.path());
        let state = feed.state.clone();

        feed.handle_line(
            r#"{"type":"notification_posted","package":"org.example.mail","channel":"inbox"}"#,
        );
        feed.handle_line(
            r#"{"type":"notification_removed","package":"org.example.mail","channel":"inbox"}"#,
        );

        assert!(state.active().is_empty());
    }

    #[test]
    fn metadata_messages_update_state_without_events() {
        let dir = tempfile::tempdir().unwrap();
        let (mut feed, rx) = feed_with_channel(dir.path());
        let state = feed.state.clone();

        feed.handle_line(
            r#"{"type":"channel_info","package":"org.example.mail","channel":"inbox","importance":4,"bypass_dnd":true}"#,
        );
        feed.handle_line(r#"{"type":"interruption_filter","filter":"priority"}"#);
        feed.handle_line(r#"{"type":"policy_access","granted":true}"#);

        assert_eq!(
            state.channel_info("org.example.mail", "inbox"),
            Some(ChannelInfo {
                importance: 4,
                can_bypass_dnd: true
            })
        );
        assert_eq!(state.interruption_filter(), InterruptionFilter::Priority);
        assert!(state.policy_access_granted());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn malformed_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut feed, rx) = feed_with_channel(dir.path());

        assert!(feed.handle_line("{not json"));
        assert!(feed.handle_line(r#"{"type":"unheard_of"}"#));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn settings_changed_message_emits_event() {
        let dir = tempfile::tempdir().unwrap();
        let (mut feed, rx) = feed_with_channel(dir.path());

        feed.handle_line(r#"{"type":"settings_changed","key":"essential_apps"}"#);

        assert!(matches!(
            rx.try_recv().unwrap(),
            ServiceEvent::SettingsChanged(key) if key == "essential_apps"
        ));
    }

    #[test]
    fn flip_message_emits_flip_event() {
        let dir = tempfile::tempdir().unwrap();
        let (mut feed, rx) = feed_with_channel(dir.path());

        feed.handle_line(r#"{"type":"flip","flipped":true}"#);

        assert!(matches!(rx.try_recv().unwrap(), ServiceEvent::Flip(true)));
    }
}
