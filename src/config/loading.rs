//! Configuration loading, path resolution, and default generation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::constants::CONFIG_FILE_NAME;

/// Custom config directory set from `--config <dir>`; fixed for the process
/// lifetime.
static CUSTOM_CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Override the config directory (from the CLI). Must be called before the
/// first load.
pub fn set_config_dir(dir: &str) -> Result<()> {
    let path = PathBuf::from(dir);
    if !path.is_dir() {
        anyhow::bail!("Config directory does not exist: {dir}");
    }
    CUSTOM_CONFIG_DIR
        .set(path)
        .map_err(|_| anyhow::anyhow!("Config directory already set"))
}

/// The custom config directory, when one was passed on the command line.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CUSTOM_CONFIG_DIR.get().cloned()
}

/// Resolve the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(dir) = get_custom_config_dir() {
        return Ok(dir.join(CONFIG_FILE_NAME));
    }
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("glintd").join(CONFIG_FILE_NAME))
}

/// Load and validate the configuration, creating a default config file on
/// first run.
pub fn load() -> Result<Config> {
    let path = get_config_path()?;
    if !path.exists() {
        create_default_config(&path)?;
    }
    load_from_path(&path)
}

/// Load and validate the configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    validate_config(&config)?;
    Ok(config)
}

/// Write the commented default configuration to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write default config: {}", path.display()))?;

    log_block_start!(
        "Created default configuration: {}",
        crate::common::private_path(path)
    );
    Ok(())
}

const DEFAULT_CONFIG: &str = r#"#[Service]
enabled = true             # Master switch for the lighting feature
sink = "auto"              # Animation sink: "auto", "pipe", "debug"
#sink_pipe = "/run/user/1000/glintd-animations"

#[Flip]
flip_enabled = true        # Mute and glow when the device is placed face down

#[Notifications]
notifs_enabled = true      # Glow on eligible notifications
notifs_animation = "pulse" # Animation played for eligible notifications
notif_apps = []            # Apps allowed to trigger the glow
essential_apps = []        # Apps whose notifications keep a looping glow
ignored_apps = []          # Apps that never trigger anything
ignored_channels = []      # "app:channel" pairs that never trigger
"#;
