//! Configuration validation.
//!
//! Catches configurations that would misbehave at runtime: animation ids
//! that break the sink's line protocol, channel ignore entries that can
//! never match, and contradictory app lists (warned, not rejected; the
//! ignore list simply wins at evaluation time).

use anyhow::Result;

use super::Config;

/// Validate a configuration, logging warnings for suspicious-but-legal
/// combinations.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(animation) = &config.notifs_animation {
        validate_animation_id(animation)?;
    }

    if let Some(channels) = &config.ignored_channels {
        for entry in channels {
            if !entry.contains(':') {
                anyhow::bail!(
                    "Invalid ignored_channels entry '{entry}': expected \"app:channel\" format"
                );
            }
        }
    }

    if let Some(path) = &config.sink_pipe
        && path.is_empty()
    {
        anyhow::bail!("sink_pipe must not be empty when set");
    }

    // An app on both lists is legal; the ignore list wins. Point it out so
    // the contradiction doesn't go unnoticed.
    if let (Some(ignored), Some(enabled)) = (&config.ignored_apps, &config.notif_apps) {
        for app in enabled {
            if ignored.contains(app) {
                log_warning!("App '{app}' is both enabled and ignored; it will never trigger");
            }
        }
    }
    if let (Some(ignored), Some(essential)) = (&config.ignored_apps, &config.essential_apps) {
        for app in essential {
            if ignored.contains(app) {
                log_warning!("App '{app}' is both essential and ignored; it will never trigger");
            }
        }
    }

    Ok(())
}

/// Animation ids travel as single tokens on the sink's line protocol.
fn validate_animation_id(animation: &str) -> Result<()> {
    if animation.is_empty() {
        anyhow::bail!("notifs_animation must not be empty");
    }
    if animation.chars().any(char::is_whitespace) {
        anyhow::bail!("notifs_animation must not contain whitespace: '{animation}'");
    }
    Ok(())
}
