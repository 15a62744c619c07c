//! Animation sink abstraction.
//!
//! The core emits an idempotent animation command stream; rendering is an
//! external collaborator. This module provides the [`AnimationSink`] trait
//! the dispatcher drives, plus selection and construction of the concrete
//! adapter:
//!
//! - **Pipe sink**: writes one command per line to a FIFO consumed by the
//!   rendering engine.
//! - **Debug sink**: logs commands without rendering anything; useful when
//!   no engine is attached.
//!
//! ## Sink Selection
//!
//! The sink can be selected automatically or explicitly via `sink = "auto"`,
//! `"pipe"`, or `"debug"` in the config. Auto-detection picks the pipe sink
//! when the rendering engine's FIFO is already present and falls back to the
//! debug sink otherwise.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::{Config, Sink};

pub mod debug;
pub mod pipe;

/// Trait for animation sinks that execute the core's command stream.
///
/// Commands must be idempotent at the sink: replaying `play_essential` while
/// the essential animation is already looping, or `stop_essential` while
/// nothing plays, is a no-op for the renderer.
pub trait AnimationSink: Send {
    /// Start a one-shot animation by id.
    fn play(&mut self, animation: &str) -> Result<()>;

    /// Start (or keep playing) the looping essential animation.
    fn play_essential(&mut self) -> Result<()>;

    /// Stop the essential animation if it is playing.
    fn stop_essential(&mut self) -> Result<()>;

    /// Human-readable name for this sink.
    fn sink_name(&self) -> &'static str;
}

/// Enumeration of concrete sink types after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkType {
    Pipe,
    Debug,
}

impl SinkType {
    pub fn name(&self) -> &'static str {
        match self {
            SinkType::Pipe => "pipe",
            SinkType::Debug => "debug",
        }
    }
}

/// Resolve which sink to use from the configuration.
pub fn detect_sink(config: &Config) -> SinkType {
    match config.sink.unwrap_or(Sink::Auto) {
        Sink::Pipe => SinkType::Pipe,
        Sink::Debug => SinkType::Debug,
        Sink::Auto => {
            // Use the pipe when a rendering engine already opened its FIFO
            if sink_pipe_path(config).exists() {
                SinkType::Pipe
            } else {
                SinkType::Debug
            }
        }
    }
}

/// Create a sink instance of the resolved type.
pub fn create_sink(
    sink_type: SinkType,
    config: &Config,
    debug_enabled: bool,
) -> Result<Box<dyn AnimationSink>> {
    match sink_type {
        SinkType::Pipe => Ok(Box::new(pipe::PipeSink::new(
            sink_pipe_path(config),
            debug_enabled,
        )?)),
        SinkType::Debug => Ok(Box::new(debug::DebugSink::new())),
    }
}

/// The FIFO path the pipe sink writes to.
pub fn sink_pipe_path(config: &Config) -> PathBuf {
    match &config.sink_pipe {
        Some(path) => PathBuf::from(path),
        None => crate::common::runtime_dir().join(crate::constants::DEFAULT_SINK_PIPE_NAME),
    }
}
