//! Flip-to-mute state machine.
//!
//! Converts raw orientation sensor callbacks into a single debounced flip
//! state with a mute/animate side effect. The machine has exactly two
//! states:
//!
//! - `Normal`: device face up; ringer untouched.
//! - `Flipped`: device face down; ringer silenced, pre-flip mode captured
//!   for restore.
//!
//! Duplicate sensor callbacks at the same logical state are no-ops, so
//! jittery sensors cannot double-trigger the side effects. The captured
//! ringer mode, not the live value, is restored on the way back, so
//! external ringer changes made *while* flipped do not leak into the
//! restore.

use crate::audio::{RingerControl, RingerMode};
use crate::constants::{ANIMATION_WAKE_LOCK, FLIP_ANIMATION};
use crate::core::dispatch::{AnimationCommand, Dispatcher};

/// The two phases of the flip machine.
enum FlipPhase {
    Normal,
    Flipped {
        /// Ringer mode captured on entry; `None` when the capture itself
        /// failed, in which case nothing is restored on exit.
        saved_ringer: Option<RingerMode>,
    },
}

/// Debounced flip monitor owning the flip state.
pub struct FlipMonitor {
    phase: FlipPhase,
    debug_enabled: bool,
}

impl FlipMonitor {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            phase: FlipPhase::Normal,
            debug_enabled,
        }
    }

    pub fn is_flipped(&self) -> bool {
        matches!(self.phase, FlipPhase::Flipped { .. })
    }

    /// Handle one sensor callback.
    ///
    /// Idempotent: a callback reporting the current logical state does
    /// nothing. The phase is updated only after the transition's side
    /// effects ran, so the state always reflects a fully-applied transition.
    pub fn on_sensor_event(
        &mut self,
        flipped: bool,
        ringer: &dyn RingerControl,
        dispatcher: &Dispatcher,
    ) {
        if flipped == self.is_flipped() {
            return;
        }
        if self.debug_enabled {
            log_debug!("Flip edge: face {}", if flipped { "down" } else { "up" });
        }

        self.phase = if flipped {
            Self::enter_flipped(ringer, dispatcher)
        } else {
            let saved = match &self.phase {
                FlipPhase::Flipped { saved_ringer } => *saved_ringer,
                FlipPhase::Normal => None,
            };
            Self::exit_flipped(saved, ringer)
        };
    }

    /// Entry action for `Flipped`: capture the ringer mode, silence, play
    /// the flip animation under a wake-lock.
    ///
    /// Audio failures skip that side effect for this transition: no retry,
    /// no crash.
    fn enter_flipped(ringer: &dyn RingerControl, dispatcher: &Dispatcher) -> FlipPhase {
        let saved_ringer = match ringer.mode() {
            Ok(mode) => Some(mode),
            Err(e) => {
                log_warning!("Could not read ringer mode; restore will be skipped: {e}");
                None
            }
        };

        if let Err(e) = ringer.set_mode(RingerMode::Silent) {
            log_warning!("Could not silence ringer: {e}");
        }

        dispatcher.enqueue(
            AnimationCommand::Play(FLIP_ANIMATION.to_string()),
            Some(ANIMATION_WAKE_LOCK),
        );

        FlipPhase::Flipped { saved_ringer }
    }

    /// Exit action for `Flipped`: restore the captured ringer mode.
    fn exit_flipped(saved_ringer: Option<RingerMode>, ringer: &dyn RingerControl) -> FlipPhase {
        if let Some(mode) = saved_ringer
            && let Err(e) = ringer.set_mode(mode)
        {
            log_warning!("Could not restore ringer mode to {}: {e}", mode.name());
        }
        FlipPhase::Normal
    }
}
