//! Configuration system for glintd with validation and hot reload.
//!
//! Settings are loaded from a TOML file (`$XDG_CONFIG_HOME/glintd/glintd.toml`
//! by default, overridable with `--config <dir>`). The loaded `Config` is the
//! policy snapshot the decision core evaluates against: the core re-reads it
//! per evaluation pass and replaces it wholesale on reload, so no callback
//! path ever observes a torn update.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Service]
//! enabled = true             # Master switch for the lighting feature
//! sink = "auto"              # Animation sink: "auto", "pipe", "debug"
//!
//! #[Flip]
//! flip_enabled = true        # Mute and glow when the device is placed face down
//!
//! #[Notifications]
//! notifs_enabled = true      # Glow on eligible notifications
//! notifs_animation = "pulse" # Animation played for eligible notifications
//! notif_apps = ["org.example.mail"]       # Apps allowed to trigger the glow
//! essential_apps = ["org.example.pager"]  # Apps whose notifications keep a looping glow
//! ignored_apps = []                       # Apps that never trigger anything
//! ignored_channels = []                   # "app:channel" pairs that never trigger
//! ```
//!
//! ## Validation and Error Handling
//!
//! Configurations are validated on load and on reload; a reload that fails
//! validation keeps the previous configuration running.

pub mod loading;
pub mod validation;
pub mod watcher;

#[cfg(test)]
mod tests;

use anyhow::Result;
use serde::Deserialize;

use crate::constants::*;

// Re-export public API
pub use loading::{get_config_path, get_custom_config_dir, set_config_dir};
pub use watcher::start_config_watcher;

/// Animation sink selection.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sink {
    /// Pipe when a rendering engine's FIFO is present, debug otherwise.
    Auto,
    /// FIFO consumed by the external rendering engine.
    Pipe,
    /// Log commands only; no rendering engine required.
    Debug,
}

impl Sink {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sink::Auto => "auto",
            Sink::Pipe => "pipe",
            Sink::Debug => "debug",
        }
    }
}

/// glintd application settings.
///
/// Most fields are optional and fall back to the defaults in `constants`.
/// Accessors below apply the defaults so call sites never unwrap.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Master switch for the whole lighting feature.
    pub enabled: Option<bool>,
    /// Flip-to-mute sub-feature.
    pub flip_enabled: Option<bool>,
    /// Notification glow sub-feature.
    pub notifs_enabled: Option<bool>,
    /// Animation id played for eligible notifications.
    pub notifs_animation: Option<String>,
    /// Apps allowed to trigger the one-shot notification glow.
    pub notif_apps: Option<Vec<String>>,
    /// Apps whose active notifications keep the looping essential glow.
    pub essential_apps: Option<Vec<String>>,
    /// Apps that never trigger anything, regardless of other settings.
    pub ignored_apps: Option<Vec<String>>,
    /// `"app:channel"` pairs that never trigger anything.
    pub ignored_channels: Option<Vec<String>>,
    /// Animation sink selection.
    pub sink: Option<Sink>,
    /// FIFO path override for the pipe sink.
    pub sink_pipe: Option<String>,
}

impl Config {
    /// Load the configuration from the default path, creating a default
    /// config file on first run.
    pub fn load() -> Result<Self> {
        loading::load()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(DEFAULT_ENABLED)
    }

    pub fn is_flip_enabled(&self) -> bool {
        self.flip_enabled.unwrap_or(DEFAULT_FLIP_ENABLED)
    }

    pub fn are_notifs_enabled(&self) -> bool {
        self.notifs_enabled.unwrap_or(DEFAULT_NOTIFS_ENABLED)
    }

    pub fn notifs_animation(&self) -> &str {
        self.notifs_animation
            .as_deref()
            .unwrap_or(DEFAULT_NOTIF_ANIMATION)
    }

    pub fn is_app_enabled(&self, package: &str) -> bool {
        self.notif_apps
            .as_ref()
            .is_some_and(|apps| apps.iter().any(|app| app == package))
    }

    pub fn is_app_essential(&self, package: &str) -> bool {
        self.essential_apps
            .as_ref()
            .is_some_and(|apps| apps.iter().any(|app| app == package))
    }

    pub fn is_app_ignored(&self, package: &str) -> bool {
        self.ignored_apps
            .as_ref()
            .is_some_and(|apps| apps.iter().any(|app| app == package))
    }

    pub fn is_channel_ignored(&self, package: &str, channel_id: &str) -> bool {
        let key = format!("{package}:{channel_id}");
        self.ignored_channels
            .as_ref()
            .is_some_and(|channels| channels.iter().any(|channel| *channel == key))
    }

    /// Whether the essential-apps set differs between two configs. Drives
    /// the settings-changed path of the policy engine after a reload.
    pub fn essential_apps_changed(&self, other: &Config) -> bool {
        self.essential_apps != other.essential_apps
    }

    /// Whether any field the notification policy evaluates differs between
    /// two configs. A reload that changes none of these needs no
    /// reevaluation.
    pub fn notification_policy_changed(&self, other: &Config) -> bool {
        self.enabled != other.enabled
            || self.notifs_enabled != other.notifs_enabled
            || self.notifs_animation != other.notifs_animation
            || self.notif_apps != other.notif_apps
            || self.essential_apps != other.essential_apps
            || self.ignored_apps != other.ignored_apps
            || self.ignored_channels != other.ignored_channels
    }

    /// Log the effective configuration in the standard block format.
    pub fn log_config(&self, sink_type: Option<crate::sink::SinkType>) {
        log_block_start!("Loaded configuration");
        log_indented!("Feature enabled: {}", self.is_enabled());
        log_indented!("Flip-to-mute: {}", self.is_flip_enabled());
        log_indented!("Notification glow: {}", self.are_notifs_enabled());
        log_indented!("Notification animation: {}", self.notifs_animation());
        log_indented!(
            "Enabled apps: {}",
            self.notif_apps.as_ref().map_or(0, |apps| apps.len())
        );
        log_indented!(
            "Essential apps: {}",
            self.essential_apps.as_ref().map_or(0, |apps| apps.len())
        );
        if let Some(sink_type) = sink_type {
            log_indented!("Animation sink: {}", sink_type.name());
        }
    }
}
