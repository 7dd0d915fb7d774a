//! Loading tests for sgpconfig

use serde_yaml::Value;
use sgpconfig::Config;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

#[test]
fn test_defaults_are_written_to_config_dir() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(dir.path()).unwrap();

    assert_eq!(config.get_http_port(), 8080);
    assert_eq!(config.get_bind_address(), "0.0.0.0");
    assert_eq!(config.get_log_min_level(), "INFO");
    assert!(config.get_log_enable_console());
    assert_eq!(
        config.get_string_or(&["resolver", "allowed_host_suffix"], "x"),
        "soundgasm.net"
    );
    assert!(dir.path().join("config.yaml").exists());
}

#[test]
fn test_config_file_overrides_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        r#"
Host:
  HTTP_Port: 9191
  logger:
    enable_console: false
resolver:
  timeout_secs: 5
queue:
  player:
    command: [ffplay, -nodisp, -autoexit]
"#,
    )
    .unwrap();

    let config = Config::load_from(dir.path()).unwrap();

    assert_eq!(config.get_http_port(), 9191);
    assert!(!config.get_log_enable_console());
    assert_eq!(config.get_u64_or(&["resolver", "timeout_secs"], 30), 5);
    assert_eq!(
        config.get_string_list_or(&["queue", "player", "command"], &["mpv"]),
        vec!["ffplay", "-nodisp", "-autoexit"]
    );
    // Les clés absentes du fichier gardent la valeur embarquée
    assert_eq!(config.get_bind_address(), "0.0.0.0");
}

#[test]
fn test_env_overrides_config_file() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "host:\n  http_port: 9191\n").unwrap();

    std::env::set_var("SGPLAYLIST_CONFIG__HOST__HTTP_PORT", "7070");
    let config = Config::load_from(dir.path());
    std::env::remove_var("SGPLAYLIST_CONFIG__HOST__HTTP_PORT");

    assert_eq!(config.unwrap().get_http_port(), 7070);
}

#[test]
fn test_invalid_port_falls_back_to_default() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "host:\n  http_port: 700000\n").unwrap();

    let config = Config::load_from(dir.path()).unwrap();
    assert_eq!(config.get_http_port(), 8080);
}

#[test]
fn test_managed_dir_default_is_recorded() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();

    let config = Config::load_from(dir.path()).unwrap();
    let cache = config.get_managed_dir(&["extra", "cache_dir"], "cache").unwrap();
    assert!(cache.is_dir());
    assert!(cache.starts_with(dir.path()));

    let reloaded = Config::load_from(dir.path()).unwrap();
    assert_eq!(
        reloaded.get_value(&["extra", "cache_dir"]),
        Some(Value::String("cache".into()))
    );
}

#[test]
fn test_string_list_accepts_whitespace_separated_string() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "queue:\n  player:\n    command: \"mpv --no-video\"\n",
    )
    .unwrap();

    let config = Config::load_from(dir.path()).unwrap();
    assert_eq!(
        config.get_string_list_or(&["queue", "player", "command"], &["x"]),
        vec!["mpv", "--no-video"]
    );
}
