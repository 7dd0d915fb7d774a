//! Queue controller
//!
//! Owns the queue state and drives its three collaborators: a
//! [`TrackResolver`] for page URLs, a [`PlaybackSurface`] for audio output and
//! a [`StateStore`] for persistence. Every mutation is followed by a save.
//!
//! All operations take `&mut self`. A batch add keeps exclusive access while
//! it awaits each resolution, so no other mutation can interleave with it.
//!
//! ```text
//!   Idle ──play_at_index(i)──▶ Playing(i)
//!   Playing(i) ──ended / play_next──▶ Playing(i+1) | Idle
//!   Playing(i) ──remove_at_index(i)──▶ Idle
//!   any ──clear──▶ Idle
//! ```

use crate::error::Error;
use crate::persistence::StateStore;
use crate::playback::{PlaybackEvent, PlaybackSurface};
use crate::resolver::TrackResolver;
use crate::state::QueueState;
use crate::track::TrackEntry;
use sgpresolver::is_direct_audio;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Tone of a status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// User-facing status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub tone: Tone,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A page URL that could not be added
#[derive(Debug)]
pub struct AddFailure {
    pub page_url: String,
    pub error: Error,
}

/// Outcome of [`QueueController::add_urls`]
#[derive(Debug, Default)]
pub struct AddReport {
    /// Entries appended to the queue, in input order
    pub added: Vec<TrackEntry>,
    /// Input URLs skipped because already queued or repeated in the batch
    pub duplicates: usize,
    pub failures: Vec<AddFailure>,
}

pub struct QueueController<P, S> {
    state: QueueState,
    resolver: Arc<dyn TrackResolver>,
    surface: P,
    store: S,
    status: Option<Status>,
}

impl<P: PlaybackSurface, S: StateStore> QueueController<P, S> {
    /// Builds the controller, rehydrating the saved state if any
    ///
    /// A saved index pointing past the end of the saved queue is reset. When
    /// a track is selected its source is loaded but playback is not started.
    pub fn new(resolver: Arc<dyn TrackResolver>, mut surface: P, store: S) -> Self {
        let mut state = store.load().unwrap_or_default();
        if state.normalize() {
            warn!("Saved queue index out of range, selection reset");
        }

        if let Some(track) = state.current() {
            surface.set_source(&track.audio_url);
        }

        info!(
            "Queue ready: {} track(s), current index {:?}",
            state.len(),
            state.current_index
        );

        Self {
            state,
            resolver,
            surface,
            store,
            status: None,
        }
    }

    pub fn state(&self) -> &QueueState {
        &self.state
    }

    pub fn queue(&self) -> &[TrackEntry] {
        &self.state.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn surface(&self) -> &P {
        &self.surface
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `Playing: <title>` or `Nothing playing.`
    pub fn now_playing(&self) -> String {
        match self.state.current() {
            Some(track) => format!("Playing: {}", track.label()),
            None => "Nothing playing.".to_string(),
        }
    }

    fn set_status(&mut self, status: Status) {
        match status.tone {
            Tone::Error => warn!("{}", status.message),
            Tone::Info | Tone::Success => info!("{}", status.message),
        }
        self.status = Some(status);
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.state) {
            error!("Failed to save queue state: {}", e);
        }
    }

    /// Adds every URL of `raw_text`, one per line
    ///
    /// Blank lines are ignored, as are URLs already queued or repeated
    /// earlier in the same text. Direct audio URLs are queued as is; the
    /// others are resolved one after the other. A failing URL is reported
    /// and skipped.
    pub async fn add_urls(&mut self, raw_text: &str) -> AddReport {
        let urls: Vec<&str> = raw_text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut report = AddReport::default();

        if urls.is_empty() {
            self.set_status(Status::error("Paste at least one Soundgasm URL."));
            return report;
        }

        let mut seen: HashSet<&str> = self.state.queue.iter().map(|t| t.page_url.as_str()).collect();
        let mut unique = Vec::with_capacity(urls.len());
        for url in urls {
            if seen.insert(url) {
                unique.push(url.to_string());
            } else {
                report.duplicates += 1;
            }
        }
        drop(seen);

        if unique.is_empty() {
            self.set_status(Status::info("All URLs are already in the queue."));
            return report;
        }

        self.set_status(Status::info("Resolving URLs..."));

        for page_url in unique {
            if is_direct_audio(&page_url) {
                debug!("Direct audio URL {}", page_url);
                report.added.push(TrackEntry::direct(&page_url));
                continue;
            }

            match self.resolver.resolve(&page_url).await {
                Ok(resolution) => {
                    let title = resolution
                        .title
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| page_url.clone());
                    report
                        .added
                        .push(TrackEntry::new(page_url, resolution.audio_url, Some(title)));
                }
                Err(e) => {
                    let message = match &e {
                        Error::ResolverStatus { .. } | Error::Resolver(_) => {
                            format!("Resolver failed for {}", page_url)
                        }
                        Error::MissingAudioUrl => {
                            format!("Resolver returned no audio URL for {}", page_url)
                        }
                        _ => format!("Resolver error for {}", page_url),
                    };
                    debug!("Resolution of {} failed: {}", page_url, e);
                    self.set_status(Status::error(message));
                    report.failures.push(AddFailure { page_url, error: e });
                }
            }
        }

        self.state.queue.extend(report.added.iter().cloned());
        self.persist();

        if !report.added.is_empty() {
            self.set_status(Status::success(format!(
                "Added {} item(s) to the queue.",
                report.added.len()
            )));
        }

        report
    }

    /// Selects and plays track `index`
    ///
    /// Returns false (and changes nothing) when `index` is out of range.
    /// A playback start failure only sets an error status.
    pub async fn play_at_index(&mut self, index: usize) -> bool {
        let Some(track) = self.state.queue.get(index).cloned() else {
            debug!("play_at_index({}) ignored, queue has {} track(s)", index, self.state.len());
            return false;
        };

        self.state.current_index = Some(index);
        self.surface.set_source(&track.audio_url);
        self.persist();

        match self.surface.play().await {
            Ok(()) => self.set_status(Status::success(format!("Playing {}", track.label()))),
            Err(e) => {
                debug!("Playback start failed: {}", e);
                self.set_status(Status::error(format!("Unable to start playback: {}", e)));
            }
        }
        true
    }

    /// Plays the track after the current one, or stops at the end
    pub async fn play_next(&mut self) {
        let next = self.state.current_index.map_or(0, |i| i + 1);

        if next >= self.state.len() {
            let was_empty = self.state.is_empty();
            self.surface.stop();
            self.state.current_index = None;
            self.persist();
            if !was_empty {
                self.set_status(Status::info("Reached end of queue."));
            }
            return;
        }

        self.play_at_index(next).await;
    }

    /// Removes track `index`, keeping the selection on the same track
    ///
    /// Removing the selected track stops playback. Out of range indices are
    /// ignored.
    pub fn remove_at_index(&mut self, index: usize) -> Option<TrackEntry> {
        if index >= self.state.len() {
            debug!("remove_at_index({}) ignored, queue has {} track(s)", index, self.state.len());
            return None;
        }

        let removed = self.state.queue.remove(index);
        match self.state.current_index {
            Some(current) if current == index => {
                self.surface.stop();
                self.state.current_index = None;
            }
            Some(current) if index < current => {
                self.state.current_index = Some(current - 1);
            }
            _ => {}
        }
        self.persist();

        info!("Removed {}", removed.page_url);
        Some(removed)
    }

    /// Empties the queue and stops playback
    pub fn clear(&mut self) {
        self.state.queue.clear();
        self.state.current_index = None;
        self.surface.stop();
        self.persist();
        self.set_status(Status::info("Queue cleared."));
    }

    /// Play button: starts from the top when nothing is selected, otherwise
    /// resumes the current source
    pub async fn resume(&mut self) {
        if self.state.current_index.is_none() {
            self.play_at_index(0).await;
            return;
        }

        if let Err(e) = self.surface.play().await {
            debug!("Resume failed: {}", e);
            self.set_status(Status::error("Unable to resume playback."));
        }
    }

    /// Reacts to a notification from the playback surface
    ///
    /// An end reported while nothing is selected belongs to a source that
    /// was already removed or cleared and is dropped.
    pub async fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Ended if self.state.current_index.is_none() => {
                debug!("Ignoring end of playback while idle");
            }
            PlaybackEvent::Ended => {
                debug!("Track ended");
                self.play_next().await;
            }
        }
    }
}
