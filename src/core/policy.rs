//! Notification policy engine.
//!
//! Converts notification events, active-set snapshots, and the current
//! configuration into an idempotent animation command stream. Two outcomes
//! exist per notification and they are not mutually exclusive:
//!
//! - an enabled app's eligible notification plays the configured one-shot
//!   animation;
//! - an essential app's eligible notification starts the looping essential
//!   animation.
//!
//! The essential state is never patched incrementally: every relevant
//! trigger (removal, settings change, reload, service start) rescans the
//! full active set from scratch, which makes it immune to lost-update races
//! between interleaved posted/removed events.

use crate::config::Config;
use crate::constants::{
    ANIMATION_WAKE_LOCK, IMPORTANCE_DEFAULT, IMPORTANCE_UNKNOWN, SETTING_ESSENTIAL_APPS,
};
use crate::core::dispatch::{AnimationCommand, Dispatcher};
use crate::notifications::{
    InterruptionFilter, Notification, NotificationRecord, NotificationSource,
};

/// Consistent snapshot of the evaluation environment.
///
/// Taken once at the start of an evaluation pass; a single evaluation never
/// mixes filter states read at different times.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext {
    pub interruption_filter: InterruptionFilter,
    pub notifs_enabled: bool,
    pub policy_access_granted: bool,
}

impl EvaluationContext {
    pub fn snapshot(config: &Config, source: &dyn NotificationSource) -> Self {
        Self {
            interruption_filter: source.interruption_filter(),
            notifs_enabled: config.are_notifs_enabled(),
            policy_access_granted: source.policy_access_granted(),
        }
    }
}

/// The single source of truth for "does this notification count".
///
/// Used identically by the posted path and the full reevaluation. Importance
/// below the default threshold disqualifies unless it is unknown (−1), which
/// passes; a restrictive interruption filter disqualifies unless the channel
/// bypasses DND.
pub fn eligible(record: &NotificationRecord, ctx: &EvaluationContext, config: &Config) -> bool {
    !record.is_ongoing
        && !config.is_app_ignored(&record.package)
        && !config.is_channel_ignored(&record.package, &record.channel_id)
        && (record.importance >= IMPORTANCE_DEFAULT || record.importance == IMPORTANCE_UNKNOWN)
        && (ctx.interruption_filter.allows_all() || record.can_bypass_dnd)
}

/// Notification policy engine owning the essential state.
pub struct PolicyEngine {
    /// Whether the looping essential animation is currently requested.
    /// Pure function of the active set and the policy; re-derived from
    /// scratch by every `reevaluate_essential` pass.
    essential_active: bool,
    debug_enabled: bool,
}

impl PolicyEngine {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            essential_active: false,
            debug_enabled,
        }
    }

    pub fn essential_active(&self) -> bool {
        self.essential_active
    }

    /// Handle a posted notification.
    ///
    /// Guarded by the master feature flag and the notification sub-feature.
    /// May dispatch the one-shot animation, the essential animation, both,
    /// or neither.
    pub fn on_notification_posted(
        &mut self,
        posted: &Notification,
        config: &Config,
        source: &dyn NotificationSource,
        dispatcher: &Dispatcher,
    ) {
        if !config.is_enabled() {
            return;
        }
        let ctx = EvaluationContext::snapshot(config, source);
        if !ctx.notifs_enabled {
            return;
        }

        let record = NotificationRecord::resolve(posted, source);
        if record.is_malformed() {
            if self.debug_enabled {
                log_debug!("Skipping notification without channel id from {}", record.package);
            }
            return;
        }
        if self.debug_enabled {
            log_debug!(
                "Posted: package: {} | channel: {} | importance: {} | bypass dnd: {} | filter: {}",
                record.package,
                record.channel_id,
                record.importance,
                record.can_bypass_dnd,
                ctx.interruption_filter.name()
            );
        }

        if config.is_app_enabled(&record.package) && eligible(&record, &ctx, config) {
            dispatcher.enqueue(
                AnimationCommand::Play(config.notifs_animation().to_string()),
                Some(ANIMATION_WAKE_LOCK),
            );
        }

        // Independent of the one-shot outcome above
        if config.is_app_essential(&record.package)
            && eligible(&record, &ctx, config)
            && ctx.policy_access_granted
        {
            dispatcher.enqueue(AnimationCommand::PlayEssential, None);
        }
    }

    /// Handle a removed notification. Removal only ever stops the essential
    /// state, never starts an animation, so it just reevaluates.
    pub fn on_notification_removed(
        &mut self,
        package: &str,
        channel_id: &str,
        config: &Config,
        source: &dyn NotificationSource,
        dispatcher: &Dispatcher,
    ) {
        if self.debug_enabled {
            log_debug!("Removed: package: {package} | channel: {channel_id}");
        }
        self.reevaluate_essential(config, source, dispatcher);
    }

    /// Handle a settings change. Only the essential-apps key concerns this
    /// engine; every other key is handled by the reload path.
    pub fn on_settings_changed(
        &mut self,
        key: &str,
        config: &Config,
        source: &dyn NotificationSource,
        dispatcher: &Dispatcher,
    ) {
        if key == SETTING_ESSENTIAL_APPS {
            if self.debug_enabled {
                log_debug!("Settings changed: {key}");
            }
            self.reevaluate_essential(config, source, dispatcher);
        }
    }

    /// Recompute the essential state from the full active-notification set.
    ///
    /// Abstains (leaves the state untouched and dispatches nothing) when
    /// the feature is disabled or policy access is not granted: without
    /// access the active set is not the truth, and forcing a stop on a
    /// blind spot would drop a legitimately playing animation. The dispatch
    /// itself is unconditional on every completed pass; idempotence is the
    /// sink's contract.
    pub fn reevaluate_essential(
        &mut self,
        config: &Config,
        source: &dyn NotificationSource,
        dispatcher: &Dispatcher,
    ) {
        if !config.is_enabled() || !config.are_notifs_enabled() {
            return;
        }
        let ctx = EvaluationContext::snapshot(config, source);
        if !ctx.policy_access_granted {
            return;
        }

        let mut found = false;
        for notification in source.active() {
            let record = NotificationRecord::resolve(&notification, source);
            if record.is_malformed() {
                continue;
            }
            if self.debug_enabled {
                log_debug!(
                    "Scan: package: {} | channel: {} | importance: {} | bypass dnd: {}",
                    record.package,
                    record.channel_id,
                    record.importance,
                    record.can_bypass_dnd
                );
            }
            if config.is_app_essential(&record.package) && eligible(&record, &ctx, config) {
                if self.debug_enabled {
                    log_debug!("Found essential notification | package: {}", record.package);
                }
                found = true;
            }
        }

        self.essential_active = found;
        let command = if found {
            AnimationCommand::PlayEssential
        } else {
            AnimationCommand::StopEssential
        };
        dispatcher.enqueue(command, None);
    }
}
