//! Logging-only animation sink for running without a rendering engine.

use anyhow::Result;

use super::AnimationSink;

pub struct DebugSink {
    essential_playing: bool,
}

impl DebugSink {
    pub fn new() -> Self {
        Self {
            essential_playing: false,
        }
    }
}

impl Default for DebugSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSink for DebugSink {
    fn play(&mut self, animation: &str) -> Result<()> {
        log_decorated!("Animation: play {animation}");
        Ok(())
    }

    fn play_essential(&mut self) -> Result<()> {
        if !self.essential_playing {
            log_decorated!("Animation: essential start");
            self.essential_playing = true;
        }
        Ok(())
    }

    fn stop_essential(&mut self) -> Result<()> {
        if self.essential_playing {
            log_decorated!("Animation: essential stop");
            self.essential_playing = false;
        }
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "Debug"
    }
}
