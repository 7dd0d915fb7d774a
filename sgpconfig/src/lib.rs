//! # SGPlaylist configuration
//!
//! A single YAML tree built from three layers, the later ones winning:
//!
//! 1. the defaults embedded in the binary (`sgplaylist.yaml`);
//! 2. `config.yaml` in the configuration directory;
//! 3. `SGPLAYLIST_CONFIG__SECTION__KEY=value` environment variables.
//!
//! Keys are case-insensitive. The merged tree is written back to
//! `config.yaml` so that the file always lists every known setting.
//!
//! Crates of the workspace read their own section through extension traits
//! (`ResolverConfigExt`, `QueueConfigExt`) built on the generic accessors
//! below.
//!
//! ```no_run
//! use sgpconfig::get_config;
//!
//! let config = get_config();
//! println!("listening on {}:{}", config.get_bind_address(), config.get_http_port());
//! ```

use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = include_str!("sgplaylist.yaml");

const ENV_CONFIG_DIR: &str = "SGPLAYLIST_CONFIG";
const ENV_PREFIX: &str = "SGPLAYLIST_CONFIG__";
const DIR_NAME: &str = ".sgplaylist";
const FILE_NAME: &str = "config.yaml";

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(
        Config::load_from(&Config::discover_dir()).expect("Failed to load SGPlaylist configuration")
    );
}

/// Returns the process-wide configuration, loaded on first use
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merged configuration tree bound to its `config.yaml`
#[derive(Debug)]
pub struct Config {
    dir: PathBuf,
    tree: Mutex<Value>,
}

impl Config {
    /// Configuration directory used by [`get_config`]
    ///
    /// `$SGPLAYLIST_CONFIG` if set, else the first existing `.sgplaylist`
    /// in the working directory then in the home directory, else
    /// `./.sgplaylist`.
    pub fn discover_dir() -> PathBuf {
        if let Some(dir) = env::var_os(ENV_CONFIG_DIR) {
            return PathBuf::from(dir);
        }

        let local = PathBuf::from(DIR_NAME);
        let home = dirs::home_dir().map(|h| h.join(DIR_NAME));
        std::iter::once(local.clone())
            .chain(home)
            .find(|candidate| candidate.is_dir())
            .unwrap_or(local)
    }

    /// Loads the three layers from `dir`, creating it when missing
    pub fn load_from(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create config directory {}", dir.display()))?;
        if !dir.is_dir() {
            bail!("{} is not a directory", dir.display());
        }
        info!(config_dir = %dir.display(), "Using config directory");

        let mut tree: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let file = dir.join(FILE_NAME);
        match fs::read_to_string(&file) {
            Ok(text) => {
                let layer: Value = serde_yaml::from_str(&text)
                    .with_context(|| format!("invalid YAML in {}", file.display()))?;
                overlay(&mut tree, layer);
                info!(config_file = %file.display(), "Loaded config file");
            }
            Err(_) => info!(config_file = %file.display(), "No config file, using defaults"),
        }

        for (path, value) in env_overrides() {
            insert_at(&mut tree, &path, value);
        }

        let config = Self {
            dir: dir.to_path_buf(),
            tree: Mutex::new(tree),
        };
        config.save()?;
        Ok(config)
    }

    fn tree(&self) -> MutexGuard<'_, Value> {
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes the current tree to `config.yaml`
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&*self.tree())?;
        fs::write(self.dir.join(FILE_NAME), yaml)?;
        Ok(())
    }

    /// Value at `path`, if every segment exists
    pub fn get_value(&self, path: &[&str]) -> Option<Value> {
        path.iter()
            .try_fold(&*self.tree(), |node, key| node.get(key.to_lowercase()))
            .cloned()
    }

    /// Replaces the value at `path` and saves the file
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let keys: Vec<String> = path.iter().map(|k| k.to_lowercase()).collect();
        insert_at(&mut self.tree(), &keys, value);
        self.save()
    }

    /// String at `path`, or `default` when absent, empty or not a string
    pub fn get_string_or(&self, path: &[&str], default: &str) -> String {
        match self.get_value(path) {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => default.to_string(),
        }
    }

    /// Unsigned integer at `path`; numeric strings are accepted
    pub fn get_u64_or(&self, path: &[&str], default: u64) -> u64 {
        match self.get_value(path) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// List of strings at `path`
    ///
    /// A plain string is split on whitespace, so that
    /// `SGPLAYLIST_CONFIG__QUEUE__PLAYER__COMMAND="mpv --no-video"` works.
    pub fn get_string_list_or(&self, path: &[&str], default: &[&str]) -> Vec<String> {
        let items: Vec<String> = match self.get_value(path) {
            Some(Value::Sequence(seq)) => seq
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
            _ => Vec::new(),
        };

        if items.is_empty() {
            default.iter().map(|s| s.to_string()).collect()
        } else {
            items
        }
    }

    /// Directory named at `path`, created if needed
    ///
    /// Relative paths are taken from the configuration directory. When the
    /// key is missing, `default` is recorded in the file and used.
    pub fn get_managed_dir(&self, path: &[&str], default: &str) -> Result<PathBuf> {
        let name = match self.get_value(path) {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => {
                self.set_value(path, Value::String(default.to_string()))?;
                default.to_string()
            }
        };

        let dir = self.dir.join(name);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create directory {}", dir.display()))?;
            info!(directory = %dir.display(), "Created managed directory");
        }
        Ok(dir)
    }

    /// `host.http_port`
    pub fn get_http_port(&self) -> u16 {
        let raw = self.get_u64_or(&["host", "http_port"], u64::from(DEFAULT_HTTP_PORT));
        u16::try_from(raw).unwrap_or_else(|_| {
            warn!("Invalid HTTP port {}, using {}", raw, DEFAULT_HTTP_PORT);
            DEFAULT_HTTP_PORT
        })
    }

    /// `host.bind_address`
    pub fn get_bind_address(&self) -> String {
        self.get_string_or(&["host", "bind_address"], DEFAULT_BIND_ADDRESS)
    }

    /// `host.logger.min_level`
    pub fn get_log_min_level(&self) -> String {
        self.get_string_or(&["host", "logger", "min_level"], DEFAULT_LOG_MIN_LEVEL)
    }

    /// `host.logger.enable_console`
    pub fn get_log_enable_console(&self) -> bool {
        !matches!(
            self.get_value(&["host", "logger", "enable_console"]),
            Some(Value::Bool(false))
        )
    }
}

/// Merges `layer` into `base`, lowering the layer's keys
///
/// Mappings are merged key by key, anything else replaces the base value.
fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Mapping(base_map), Value::Mapping(layer_map)) => {
            for (key, value) in layer_map {
                let key = lower_key(key);
                match base_map.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        let mut fresh = Value::Null;
                        overlay(&mut fresh, value);
                        base_map.insert(key, fresh);
                    }
                }
            }
        }
        (base, Value::Mapping(layer_map)) => {
            *base = Value::Mapping(Mapping::new());
            overlay(base, Value::Mapping(layer_map));
        }
        (base, layer) => *base = layer,
    }
}

fn lower_key(key: Value) -> Value {
    match key {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other,
    }
}

/// Sets `value` at `path`, turning any non-mapping node on the way into a mapping
fn insert_at(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for key in parents {
        if !node.is_mapping() {
            *node = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(map) = node else { return };
        node = map
            .entry(Value::String(key.clone()))
            .or_insert(Value::Mapping(Mapping::new()));
    }

    if !node.is_mapping() {
        *node = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = node {
        map.insert(Value::String(last.clone()), value);
    }
}

/// `SGPLAYLIST_CONFIG__A__B=v` pairs as (`["a", "b"]`, parsed `v`)
fn env_overrides() -> Vec<(Vec<String>, Value)> {
    env::vars()
        .filter_map(|(name, raw)| {
            let rest = name.strip_prefix(ENV_PREFIX)?;
            let path = rest.split("__").map(str::to_lowercase).collect();
            Some((path, parse_env_value(&raw)))
        })
        .collect()
}

fn parse_env_value(raw: &str) -> Value {
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_overlay_keeps_missing_keys_and_lowers_new_ones() {
        let mut base = yaml("host:\n  http_port: 8080\n  bind_address: 0.0.0.0\n");
        overlay(&mut base, yaml("Host:\n  HTTP_Port: 9090\nExtra:\n  Key: 1\n"));

        assert_eq!(base["host"]["http_port"].as_u64(), Some(9090));
        assert_eq!(base["host"]["bind_address"], Value::from("0.0.0.0"));
        assert_eq!(base["extra"]["key"].as_u64(), Some(1));
    }

    #[test]
    fn test_overlay_replaces_sequences() {
        let mut base = yaml("cmd: [a, b, c]\n");
        overlay(&mut base, yaml("cmd: [d]\n"));
        assert_eq!(base["cmd"], yaml("[d]"));
    }

    #[test]
    fn test_insert_at_creates_and_replaces_nodes() {
        let mut root = yaml("queue: 3\n");
        let path: Vec<String> = ["queue", "player", "command"].map(String::from).to_vec();
        insert_at(&mut root, &path, Value::from("mpv"));
        assert_eq!(root["queue"]["player"]["command"], Value::from("mpv"));
    }

    #[test]
    fn test_parse_env_value() {
        assert_eq!(parse_env_value("42").as_u64(), Some(42));
        assert_eq!(parse_env_value("true"), Value::Bool(true));
        assert_eq!(parse_env_value("soundgasm.net"), Value::from("soundgasm.net"));
        assert_eq!(parse_env_value("a: [b"), Value::from("a: [b"));
    }
}
