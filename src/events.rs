//! Unified event type for everything that drives the core loop.
//!
//! All OS-delivered callbacks (the sensor feed, the notification stream,
//! signals, and the config watcher) are funneled through one mpsc channel
//! as `ServiceEvent` variants. The core processes them strictly in arrival
//! order on a single thread, so the flip state and the essential state each
//! have exactly one writer.

use crate::notifications::Notification;

/// One inbound event for the core loop.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// Debounced-at-the-core flip edge from the orientation sensor.
    Flip(bool),
    /// A notification was posted.
    NotificationPosted(Notification),
    /// A notification was removed from the active set.
    NotificationRemoved { package: String, channel_id: String },
    /// A single settings key changed (feed-driven, not a full reload).
    SettingsChanged(String),
    /// Configuration reload (SIGUSR2 or config file change).
    Reload,
    /// Shutdown (SIGTERM, SIGINT, SIGHUP).
    Shutdown,
}
