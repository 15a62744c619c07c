//! Audio mute capability used by the flip-to-mute side effect.
//!
//! The flip monitor captures the ringer mode on the face-down edge, forces
//! silence, and restores the captured mode on the way back. It only ever
//! talks to the [`RingerControl`] trait; the default system adapter drives
//! the PipeWire session manager through `wpctl`.

use anyhow::{Context, Result};
use std::process::Command;

/// Ringer mode as the device reports it.
///
/// Desktop adapters collapse `Vibrate` into mute; the capture/restore
/// contract in the flip monitor is mode-agnostic either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingerMode {
    Normal,
    Vibrate,
    Silent,
}

impl RingerMode {
    pub fn name(self) -> &'static str {
        match self {
            RingerMode::Normal => "normal",
            RingerMode::Vibrate => "vibrate",
            RingerMode::Silent => "silent",
        }
    }
}

/// Capability interface for reading and setting the system ringer mode.
///
/// Calls are assumed non-failing in normal operation; when one fails the
/// side effect is simply not applied for that transition; no retry.
#[cfg_attr(test, mockall::automock)]
pub trait RingerControl {
    /// Current ringer mode.
    fn mode(&self) -> Result<RingerMode>;

    /// Set the ringer mode.
    fn set_mode(&self, mode: RingerMode) -> Result<()>;
}

/// `wpctl`-backed ringer control for the default audio sink.
pub struct SystemRinger;

impl SystemRinger {
    const TARGET: &'static str = "@DEFAULT_AUDIO_SINK@";

    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRinger {
    fn default() -> Self {
        Self::new()
    }
}

impl RingerControl for SystemRinger {
    fn mode(&self) -> Result<RingerMode> {
        let output = Command::new("wpctl")
            .args(["get-volume", Self::TARGET])
            .output()
            .context("Failed to run wpctl to read the audio sink state")?;

        if !output.status.success() {
            anyhow::bail!(
                "wpctl get-volume exited with {}",
                output.status.code().unwrap_or(-1)
            );
        }

        // "Volume: 0.55 [MUTED]" when muted, "Volume: 0.55" otherwise
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.contains("[MUTED]") {
            Ok(RingerMode::Silent)
        } else {
            Ok(RingerMode::Normal)
        }
    }

    fn set_mode(&self, mode: RingerMode) -> Result<()> {
        let muted = match mode {
            RingerMode::Normal => "0",
            RingerMode::Vibrate | RingerMode::Silent => "1",
        };

        let status = Command::new("wpctl")
            .args(["set-mute", Self::TARGET, muted])
            .status()
            .context("Failed to run wpctl to set the audio sink mute state")?;

        if !status.success() {
            anyhow::bail!("wpctl set-mute exited with {}", status.code().unwrap_or(-1));
        }
        Ok(())
    }
}
