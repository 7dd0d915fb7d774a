//! Entrées de la file de lecture

use serde::{Deserialize, Serialize};

/// One queued track
///
/// `page_url` is the identity key: two entries never share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEntry {
    pub page_url: String,
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TrackEntry {
    pub fn new(page_url: impl Into<String>, audio_url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            page_url: page_url.into(),
            audio_url: audio_url.into(),
            title,
        }
    }

    /// Entry for a URL that already is an audio file
    ///
    /// The audio URL is the page URL and the title is its last path segment.
    pub fn direct(url: &str) -> Self {
        let title = url.rsplit('/').next().unwrap_or(url).to_string();
        Self::new(url, url, Some(title))
    }

    fn non_empty_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Title, or the page URL when there is none
    pub fn label(&self) -> &str {
        self.non_empty_title().unwrap_or(&self.page_url)
    }

    /// Title, or `Track N` (1-based) when there is none
    pub fn display_title(&self, index: usize) -> String {
        match self.non_empty_title() {
            Some(title) => title.to_string(),
            None => format!("Track {}", index + 1),
        }
    }
}
