//! Pattern extraction over raw page HTML
//!
//! The page markup is not under our control, so instead of depending on a
//! single selector the extractor tries several patterns in priority order
//! and keeps the first match.

use crate::error::Result;
use regex::Regex;

/// Extensions treated as directly playable audio files
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "ogg"];

/// Returns true when `url` already points at an audio file
///
/// Matches URLs ending in `.mp3`, `.m4a` or `.ogg`, optionally followed by a
/// query string (case-insensitive).
pub fn is_direct_audio(url: &str) -> bool {
    let lower = url.to_lowercase();
    AUDIO_EXTENSIONS.iter().any(|ext| {
        lower.ends_with(&format!(".{}", ext)) || lower.contains(&format!(".{}?", ext))
    })
}

/// Undo the JavaScript/JSON escaping commonly found in inline scripts
pub fn unescape_candidate(candidate: &str) -> String {
    candidate.replace("\\u0026", "&").replace("\\/", "/")
}

/// Compiled extraction patterns
#[derive(Debug, Clone)]
pub struct Extractor {
    title: Regex,
    audio_patterns: Vec<Regex>,
}

impl Extractor {
    /// Compile the title pattern and the ordered audio patterns
    pub fn new() -> Result<Self> {
        let title = Regex::new(r"(?i)<title>\s*([^<]+)\s*</title>")?;

        let audio_patterns = vec![
            // Any direct mp3/m4a/ogg URL in the page
            Regex::new(r#"(?i)https?://[^"' <>\n\r\t]+\.(?:mp3|m4a|ogg)(?:\?[^"' <>\n\r\t]*)?"#)?,
            // JSON-like: "url":"https://...mp3"
            Regex::new(r#"(?i)"url"\s*:\s*"([^"]+\.(?:mp3|m4a|ogg)[^"]*)""#)?,
            // <audio src="...">
            Regex::new(r#"(?i)<audio[^>]+src="([^"]+)""#)?,
        ];

        Ok(Self {
            title,
            audio_patterns,
        })
    }

    /// Extract the trimmed `<title>` text, if any
    ///
    /// A blank title element yields `Some("")`, only a missing one is `None`.
    pub fn title(&self, html: &str) -> Option<String> {
        self.title
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    /// Extract the audio URL using the first pattern that matches
    ///
    /// Patterns with a capture group yield the group, the bare-URL pattern
    /// yields the whole match.
    pub fn audio_url(&self, html: &str) -> Option<String> {
        self.audio_patterns.iter().find_map(|re| {
            re.captures(html).map(|cap| {
                let candidate = cap.get(1).or_else(|| cap.get(0)).map_or("", |m| m.as_str());
                unescape_candidate(candidate)
            })
        })
    }
}
