use super::validation::validate_config;
use super::*;
use serial_test::serial;
use tempfile::tempdir;

fn create_test_config(
    notifs_animation: Option<&str>,
    notif_apps: Option<Vec<&str>>,
    essential_apps: Option<Vec<&str>>,
    ignored_apps: Option<Vec<&str>>,
    ignored_channels: Option<Vec<&str>>,
) -> Config {
    let owned = |apps: Option<Vec<&str>>| {
        apps.map(|apps| apps.into_iter().map(str::to_string).collect::<Vec<_>>())
    };
    Config {
        enabled: Some(true),
        flip_enabled: Some(true),
        notifs_enabled: Some(true),
        notifs_animation: notifs_animation.map(str::to_string),
        notif_apps: owned(notif_apps),
        essential_apps: owned(essential_apps),
        ignored_apps: owned(ignored_apps),
        ignored_channels: owned(ignored_channels),
        sink: Some(Sink::Debug),
        sink_pipe: None,
    }
}

#[test]
#[serial]
fn test_config_load_default_creation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("glintd").join("glintd.toml");

    // Save and restore XDG_CONFIG_HOME
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    // First load should create the default config
    let result = Config::load();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    if let Err(e) = &result {
        eprintln!("Config::load() failed: {:?}", e);
    }
    assert!(result.is_ok());
    assert!(config_path.exists());
}

#[test]
#[serial]
fn test_default_config_parses_and_validates() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("glintd.toml");
    loading::create_default_config(&path).unwrap();

    let config = loading::load_from_path(&path).unwrap();
    assert!(config.is_enabled());
    assert!(config.is_flip_enabled());
    assert!(config.are_notifs_enabled());
}

#[test]
fn test_config_validation_basic() {
    let config = create_test_config(
        Some("pulse"),
        Some(vec!["org.example.mail"]),
        None,
        None,
        None,
    );
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_animation_id_rejects_whitespace() {
    let config = create_test_config(Some("pulse fast"), None, None, None, None);
    assert!(validate_config(&config).is_err());

    let config = create_test_config(Some(""), None, None, None, None);
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_ignored_channels_require_separator() {
    let config = create_test_config(None, None, None, None, Some(vec!["org.example.mail"]));
    assert!(validate_config(&config).is_err());

    let config = create_test_config(None, None, None, None, Some(vec!["org.example.mail:inbox"]));
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_contradictory_app_lists_are_legal() {
    // Ignore wins at evaluation time; validation only warns
    let config = create_test_config(
        None,
        Some(vec!["org.example.mail"]),
        None,
        Some(vec!["org.example.mail"]),
        None,
    );
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_accessor_defaults() {
    let config = Config::default();
    assert!(config.is_enabled());
    assert!(config.is_flip_enabled());
    assert!(config.are_notifs_enabled());
    assert_eq!(config.notifs_animation(), "pulse");
    assert!(!config.is_app_enabled("org.example.mail"));
    assert!(!config.is_app_essential("org.example.mail"));
    assert!(!config.is_app_ignored("org.example.mail"));
    assert!(!config.is_channel_ignored("org.example.mail", "inbox"));
}

#[test]
fn test_channel_ignore_matching() {
    let config = create_test_config(None, None, None, None, Some(vec!["org.example.mail:promo"]));
    assert!(config.is_channel_ignored("org.example.mail", "promo"));
    assert!(!config.is_channel_ignored("org.example.mail", "inbox"));
    assert!(!config.is_channel_ignored("org.example.chat", "promo"));
}

#[test]
fn test_policy_change_detection() {
    let base = create_test_config(None, Some(vec!["a"]), Some(vec!["b"]), None, None);

    let same = base.clone();
    assert!(!base.notification_policy_changed(&same));
    assert!(!base.essential_apps_changed(&same));

    let mut essential_changed = base.clone();
    essential_changed.essential_apps = Some(vec!["c".into()]);
    assert!(base.essential_apps_changed(&essential_changed));
    assert!(base.notification_policy_changed(&essential_changed));

    let mut sink_changed = base.clone();
    sink_changed.sink = Some(Sink::Pipe);
    // Sink choice is not notification policy
    assert!(!base.notification_policy_changed(&sink_changed));
}
