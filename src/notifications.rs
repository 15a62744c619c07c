//! Notification data model and the capability interface onto the OS
//! notification layer.
//!
//! The core never talks to the operating system directly: everything it
//! needs (the active-notification set, per-channel metadata, the current
//! interruption filter, and whether policy access is granted) comes through
//! the [`NotificationSource`] trait. The concrete adapter lives in
//! `io::feed`.

use serde::Deserialize;

use crate::constants::IMPORTANCE_UNKNOWN;

/// A notification as delivered by the OS stream: identity only, no channel
/// metadata. Metadata is resolved separately per evaluation because it can
/// change between evaluations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub package: String,
    pub channel_id: String,
    pub is_ongoing: bool,
}

/// Per-channel metadata resolved from the OS notification layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelInfo {
    pub importance: i32,
    pub can_bypass_dnd: bool,
}

/// A fully resolved notification, valid for exactly one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub package: String,
    pub channel_id: String,
    pub importance: i32,
    pub can_bypass_dnd: bool,
    pub is_ongoing: bool,
}

impl NotificationRecord {
    /// Resolve channel metadata for a notification through the source.
    ///
    /// A missing or unresolvable channel yields `IMPORTANCE_UNKNOWN` and no
    /// DND bypass; evaluation proceeds treating unknown importance as
    /// passing.
    pub fn resolve(notification: &Notification, source: &dyn NotificationSource) -> Self {
        let info = source
            .channel_info(&notification.package, &notification.channel_id)
            .unwrap_or(ChannelInfo {
                importance: IMPORTANCE_UNKNOWN,
                can_bypass_dnd: false,
            });

        Self {
            package: notification.package.clone(),
            channel_id: notification.channel_id.clone(),
            importance: info.importance,
            can_bypass_dnd: info.can_bypass_dnd,
            is_ongoing: notification.is_ongoing,
        }
    }

    /// A malformed record (missing channel id) is skipped for that single
    /// event; evaluation continues for the rest.
    pub fn is_malformed(&self) -> bool {
        self.channel_id.is_empty()
    }
}

/// OS-level do-not-disturb filter at evaluation time.
///
/// Ordered the way the OS reports it: anything past `All` suppresses alerts
/// unless the channel carries a DND bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterruptionFilter {
    /// Filter state could not be determined; treated as unrestricted.
    #[default]
    Unknown,
    All,
    Priority,
    None,
    Alarms,
}

impl InterruptionFilter {
    /// Whether this filter level lets every channel alert.
    pub fn allows_all(self) -> bool {
        matches!(self, InterruptionFilter::Unknown | InterruptionFilter::All)
    }

    pub fn name(self) -> &'static str {
        match self {
            InterruptionFilter::Unknown => "unknown",
            InterruptionFilter::All => "all",
            InterruptionFilter::Priority => "priority",
            InterruptionFilter::None => "none",
            InterruptionFilter::Alarms => "alarms",
        }
    }
}

/// Capability interface onto the OS notification layer.
///
/// Implementations own the active-notification set and the channel-metadata
/// table; the core queries them fresh on every evaluation pass and never
/// caches the answers.
pub trait NotificationSource {
    /// The current set of active notifications.
    fn active(&self) -> Vec<Notification>;

    /// Channel metadata for one package/channel pair, or `None` when the
    /// package is unknown or the channel cannot be resolved.
    fn channel_info(&self, package: &str, channel_id: &str) -> Option<ChannelInfo>;

    /// The interruption filter level at this moment.
    fn interruption_filter(&self) -> InterruptionFilter;

    /// Whether the OS has granted notification-policy access.
    fn policy_access_granted(&self) -> bool;
}
