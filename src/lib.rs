//! # glintd Library
//!
//! Internal library for the glintd binary.
//!
//! glintd is the decision core behind a device's ambient-light notification
//! feature: it observes a flip sensor and the OS notification stream and
//! decides, under a configurable policy, whether and how to trigger lighting
//! animations, coordinating the shared "essential" animation slot and the
//! flip-to-mute audio side effect.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Glintd` struct provides the service API with resource
//!   management
//! - **Core Logic**: `core` module holds the event loop, the flip state
//!   machine, the notification policy engine, and the dispatcher
//! - **Sinks**: `sink` module with pipe and debug animation sinks
//! - **Configuration**: `config` module for TOML-based settings with
//!   hot-reload
//! - **Infrastructure**: signal handling, the Unix-socket system feed,
//!   wake-locks, single-instance locking, and logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod audio;
pub mod common;
pub mod config;
pub mod constants;
pub mod core;
pub mod events;
pub mod io;
pub mod notifications;
pub mod sink;

// Internal modules
mod glintd;

// Re-export for binary
pub use glintd::Glintd;
