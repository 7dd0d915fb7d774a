//! Extension de sgpconfig pour la file de lecture

use crate::resolver::DEFAULT_RESOLVER_URL;
use anyhow::Result;
use sgpconfig::Config;
use std::path::PathBuf;

/// Commande de lecture par défaut
pub const DEFAULT_PLAYER_COMMAND: &[&str] = &["mpv", "--no-video", "--really-quiet"];

/// Nom du fichier d'état dans le répertoire `queue.state.directory`
pub const STATE_FILE_NAME: &str = "queue.json";

/// Trait d'extension pour sgpconfig::Config
pub trait QueueConfigExt {
    /// Chemin du fichier d'état (le répertoire est créé si besoin)
    fn queue_state_path(&self) -> Result<PathBuf>;

    /// URL racine du service de résolution
    fn get_queue_resolver_url(&self) -> String;

    /// Programme de lecture suivi de ses arguments
    fn get_queue_player_command(&self) -> Vec<String>;
}

impl QueueConfigExt for Config {
    fn queue_state_path(&self) -> Result<PathBuf> {
        let state_dir = self.get_managed_dir(&["queue", "state", "directory"], "state")?;
        Ok(state_dir.join(STATE_FILE_NAME))
    }

    fn get_queue_resolver_url(&self) -> String {
        self.get_string_or(&["queue", "resolver_url"], DEFAULT_RESOLVER_URL)
    }

    fn get_queue_player_command(&self) -> Vec<String> {
        self.get_string_list_or(&["queue", "player", "command"], DEFAULT_PLAYER_COMMAND)
    }
}
