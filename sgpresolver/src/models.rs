//! Data models exchanged by the resolver

use serde::{Deserialize, Serialize};

/// Outcome of a successful resolution
///
/// Serialized as `{"audioUrl": "...", "title": "..." | null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Direct, fetchable audio file URL
    pub audio_url: String,
    /// Page title, if the page had one
    #[serde(default)]
    pub title: Option<String>,
}

impl Resolution {
    pub fn new(audio_url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            audio_url: audio_url.into(),
            title,
        }
    }
}
