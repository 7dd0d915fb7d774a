//! État sérialisable de la file
//!
//! Format persisté : `{"queue": [...], "currentIndex": n}` où `-1` signifie
//! qu'aucune piste n'est sélectionnée.

use crate::track::TrackEntry;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Queue contents plus the selected position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueState {
    #[serde(default)]
    pub queue: Vec<TrackEntry>,
    #[serde(default, with = "sentinel_index")]
    pub current_index: Option<usize>,
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Selected track, if the index points inside the queue
    pub fn current(&self) -> Option<&TrackEntry> {
        self.current_index.and_then(|i| self.queue.get(i))
    }

    /// Reset an index pointing past the end of the queue
    ///
    /// Returns true when the index had to be reset.
    pub fn normalize(&mut self) -> bool {
        match self.current_index {
            Some(i) if i >= self.queue.len() => {
                self.current_index = None;
                true
            }
            _ => false,
        }
    }
}

/// `Option<usize>` stored as a signed integer, `-1` for `None`
mod sentinel_index {
    use super::*;

    pub fn serialize<S: Serializer>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match index {
            Some(i) => serializer.serialize_i64(*i as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}
