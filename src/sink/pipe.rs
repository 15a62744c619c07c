//! FIFO-backed animation sink.
//!
//! Writes one command per line to a named pipe the rendering engine reads:
//!
//! ```text
//! play <animation-id>
//! essential start
//! essential stop
//! ```
//!
//! Writes are non-blocking: when no engine has the read end open, the write
//! fails and the command is dropped for this trigger (the core never
//! retries; the next trigger is the retry).

use anyhow::{Context, Result};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

use super::AnimationSink;

pub struct PipeSink {
    path: PathBuf,
    debug_enabled: bool,
}

impl PipeSink {
    /// Create the sink, creating the FIFO if it does not exist yet.
    pub fn new(path: PathBuf, debug_enabled: bool) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create sink pipe directory: {}", parent.display())
                })?;
            }
            nix::unistd::mkfifo(
                &path,
                nix::sys::stat::Mode::S_IRUSR | nix::sys::stat::Mode::S_IWUSR,
            )
            .with_context(|| format!("Failed to create animation pipe: {}", path.display()))?;
        }

        Ok(Self {
            path,
            debug_enabled,
        })
    }

    fn write_line(&self, line: &str) -> Result<()> {
        // O_NONBLOCK so a missing reader surfaces as ENXIO instead of
        // blocking the dispatch worker forever
        let mut pipe = std::fs::OpenOptions::new()
            .write(true)
            .custom_flags(nix::libc::O_NONBLOCK)
            .open(&self.path)
            .with_context(|| format!("No reader on animation pipe: {}", self.path.display()))?;

        pipe.write_all(line.as_bytes())
            .and_then(|()| pipe.write_all(b"\n"))
            .with_context(|| format!("Failed to write to animation pipe: {}", self.path.display()))
    }
}

impl AnimationSink for PipeSink {
    fn play(&mut self, animation: &str) -> Result<()> {
        if self.debug_enabled {
            log_debug!("Pipe sink: play {animation}");
        }
        self.write_line(&format!("play {animation}"))
    }

    fn play_essential(&mut self) -> Result<()> {
        if self.debug_enabled {
            log_debug!("Pipe sink: essential start");
        }
        self.write_line("essential start")
    }

    fn stop_essential(&mut self) -> Result<()> {
        if self.debug_enabled {
            log_debug!("Pipe sink: essential stop");
        }
        self.write_line("essential stop")
    }

    fn sink_name(&self) -> &'static str {
        "Pipe"
    }
}
