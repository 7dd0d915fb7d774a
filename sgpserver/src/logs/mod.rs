// logs.rs
use sgpconfig::get_config;

use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::{
    Registry, filter::LevelFilter, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Niveau de log courant et handle de rechargement du filtre
#[derive(Clone)]
pub struct LogState {
    max_level: Arc<RwLock<Level>>,
    reload_handle: reload::Handle<LevelFilter, Registry>,
}

impl LogState {
    pub fn new(level: Level, reload_handle: reload::Handle<LevelFilter, Registry>) -> Self {
        Self {
            max_level: Arc::new(RwLock::new(level)),
            reload_handle,
        }
    }

    /// Change le niveau minimum à chaud
    pub fn set_max_level(&self, level: Level) -> Result<()> {
        self.reload_handle
            .reload(level_to_levelfilter(level))
            .map_err(|e| anyhow!("Failed to reload log level filter: {}", e))?;
        *self.max_level.write().unwrap_or_else(|e| e.into_inner()) = level;
        tracing::info!("Log level changed to: {}", level_to_string(level));
        Ok(())
    }

    /// Variante acceptant le nom du niveau ("ERROR", "warn", ...)
    pub fn set_max_level_str(&self, level: &str) -> Result<()> {
        let level = string_to_level(level).ok_or_else(|| {
            anyhow!("Invalid log level. Must be one of: ERROR, WARN, INFO, DEBUG, TRACE")
        })?;
        self.set_max_level(level)
    }

    pub fn get_max_level(&self) -> Level {
        *self.max_level.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Initialise le système de logging
///
/// Le niveau minimum (`host.logger.min_level`) et l'activation de la
/// console (`host.logger.enable_console`) viennent de la configuration.
/// Le filtre est rechargeable via le `LogState` retourné.
///
/// Si un subscriber global est déjà installé (tests, double appel), il est
/// conservé.
pub fn init_logging() -> LogState {
    let config = get_config();

    let level = string_to_level(&config.get_log_min_level()).unwrap_or(Level::INFO);

    let (filter, reload_handle) = reload::Layer::new(level_to_levelfilter(level));
    let log_state = LogState::new(level, reload_handle);

    let enable_console = config.get_log_enable_console();

    // L'ordre est important : le filtre doit être appliqué en premier
    let subscriber = Registry::default().with(filter);

    let installed = if enable_console {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true),
            )
            .try_init()
    } else {
        subscriber.try_init()
    };

    if let Err(e) = installed {
        tracing::debug!("Global subscriber already installed: {}", e);
    }

    log_state
}

fn string_to_level(s: &str) -> Option<Level> {
    match s.to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

fn level_to_string(level: Level) -> String {
    match level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
    .to_string()
}

fn level_to_levelfilter(level: Level) -> LevelFilter {
    match level {
        Level::ERROR => LevelFilter::ERROR,
        Level::WARN => LevelFilter::WARN,
        Level::INFO => LevelFilter::INFO,
        Level::DEBUG => LevelFilter::DEBUG,
        Level::TRACE => LevelFilter::TRACE,
    }
}
