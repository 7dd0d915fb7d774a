//! Persistance de l'état de la file
//!
//! Le contrôleur ne connaît que le trait [`StateStore`]. Deux implémentations :
//! - [`JsonFileStore`] : un fichier JSON unique, réécrit après chaque mutation
//! - [`MemoryStore`] : en mémoire, pour les tests et les sessions éphémères

use crate::error::{Error, Result};
use crate::state::QueueState;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Port de persistance de l'état
pub trait StateStore: Send {
    /// Charge l'état sauvegardé
    ///
    /// Un état absent ou illisible donne `None` : le contrôleur repart
    /// d'une file vide.
    fn load(&self) -> Option<QueueState>;

    /// Remplace l'état sauvegardé
    fn save(&self, state: &QueueState) -> Result<()>;
}

/// Stockage dans un fichier JSON
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Option<QueueState> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No saved queue at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to read saved queue {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Discarding corrupt queue state {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, state: &QueueState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Écriture dans un fichier temporaire puis renommage
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(
            "Saved queue ({} tracks) to {}",
            state.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Stockage en mémoire
///
/// Garde la forme sérialisée, comme le ferait un stockage clé/valeur.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Mutex<Option<String>>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pré-rempli avec une valeur brute (éventuellement invalide)
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            saves: Mutex::new(0),
        }
    }

    /// Valeur brute actuellement stockée
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Nombre de sauvegardes effectuées
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Option<QueueState> {
        let raw = self.raw()?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Discarding corrupt in-memory queue state: {}", e);
                None
            }
        }
    }

    fn save(&self, state: &QueueState) -> Result<()> {
        let raw = serde_json::to_string(state)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        *self.raw.lock().unwrap_or_else(|e| e.into_inner()) = Some(raw);
        *self.saves.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackEntry;

    fn sample_state() -> QueueState {
        QueueState {
            queue: vec![
                TrackEntry::new("https://soundgasm.net/u/a/1", "https://m/1.m4a", Some("One".into())),
                TrackEntry::direct("https://m/2.mp3"),
            ],
            current_index: Some(1),
        }
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("queue.json"));

        assert!(store.load().is_none());
        store.save(&sample_state()).unwrap();
        assert_eq!(store.load(), Some(sample_state()));
    }

    #[test]
    fn test_json_file_store_discards_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(JsonFileStore::new(&path).load().is_none());
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryStore::new();
        store.save(&sample_state()).unwrap();
        store.save(&QueueState::new()).unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load(), Some(QueueState::new()));
    }

    #[test]
    fn test_memory_store_corrupt() {
        assert!(MemoryStore::with_raw("[1, 2").load().is_none());
    }
}
