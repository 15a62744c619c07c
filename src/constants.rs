//! Application-wide constants for glintd.
//!
//! Centralizes the tunable values shared across the flip monitor, the
//! notification policy engine, and the dispatcher so they are documented in
//! one place.

use std::time::Duration;

// ============================================================================
// Notification importance
// ============================================================================

/// Sentinel importance for channels whose metadata could not be resolved.
/// Unknown importance passes eligibility (permissive default).
pub const IMPORTANCE_UNKNOWN: i32 = -1;

/// Baseline importance at which a channel is allowed to alert. Channels below
/// this level never trigger an animation.
pub const IMPORTANCE_DEFAULT: i32 = 3;

// ============================================================================
// Animations
// ============================================================================

/// Animation played on the face-down flip edge. Fixed, not policy-selected.
pub const FLIP_ANIMATION: &str = "flip";

/// Default animation for eligible notifications when the config does not
/// select one.
pub const DEFAULT_NOTIF_ANIMATION: &str = "pulse";

// ============================================================================
// Dispatch
// ============================================================================

/// How long the wake-lock is held around an animation dispatch. Covers the
/// worst-case animation start latency; the lock self-expires rather than
/// being released by the worker.
pub const ANIMATION_WAKE_LOCK: Duration = Duration::from_millis(2500);

/// Poll interval of the core event loop when the channel is idle.
pub const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// Settings keys
// ============================================================================

/// Settings key whose changes retrigger the essential reevaluation. Other
/// keys are handled by the reload path, not the policy engine.
pub const SETTING_ESSENTIAL_APPS: &str = "essential_apps";

// ============================================================================
// Feature defaults
// ============================================================================

pub const DEFAULT_ENABLED: bool = true;
pub const DEFAULT_FLIP_ENABLED: bool = true;
pub const DEFAULT_NOTIFS_ENABLED: bool = true;

// ============================================================================
// File names
// ============================================================================

/// Lock file name under `$XDG_RUNTIME_DIR` for single-instance enforcement.
pub const LOCK_FILE_NAME: &str = "glintd.lock";

/// Unix socket name under `$XDG_RUNTIME_DIR` for the system event feed.
pub const FEED_SOCKET_NAME: &str = "glintd.sock";

/// Default FIFO path (relative to `$XDG_RUNTIME_DIR`) for the pipe sink.
pub const DEFAULT_SINK_PIPE_NAME: &str = "glintd-animations";

/// Config file name under the config directory.
pub const CONFIG_FILE_NAME: &str = "glintd.toml";

// ============================================================================
// Config watcher
// ============================================================================

/// Debounce for config file change events; editors write in multiple steps.
pub const CONFIG_DEBOUNCE_MS: u64 = 500;
