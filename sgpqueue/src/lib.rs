//! # sgpqueue - File de lecture persistante
//!
//! Cette crate gère la file de lecture côté client :
//!
//! - [`QueueController`] : ajout (avec déduplication et résolution
//!   séquentielle), lecture, passage à la piste suivante, suppression, vidage
//! - [`StateStore`] : port de persistance ([`JsonFileStore`], [`MemoryStore`])
//! - [`PlaybackSurface`] : port de lecture ([`CommandPlayer`] lance un lecteur
//!   externe)
//! - [`TrackResolver`] : port de résolution ([`HttpResolver`] interroge le
//!   service `/resolve`)
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use sgpqueue::{CommandPlayer, HttpResolver, JsonFileStore, QueueController};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = Arc::new(HttpResolver::new("http://localhost:8080")?);
//! let (player, _events) = CommandPlayer::new(vec!["mpv".into(), "--no-video".into()])?;
//! let mut controller = QueueController::new(resolver, player, JsonFileStore::new("queue.json"));
//!
//! controller.add_urls("https://soundgasm.net/u/someone/track").await;
//! controller.play_at_index(0).await;
//! println!("{}", controller.now_playing());
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod persistence;
pub mod playback;
pub mod resolver;
pub mod state;
pub mod track;

#[cfg(feature = "sgpconfig")]
pub mod config_ext;

pub use controller::{AddFailure, AddReport, QueueController, Status, Tone};
pub use error::{Error, Result};
pub use persistence::{JsonFileStore, MemoryStore, StateStore};
pub use playback::{CommandPlayer, PlaybackEvent, PlaybackEvents, PlaybackSurface};
pub use resolver::{HttpResolver, TrackResolver};
pub use state::QueueState;
pub use track::TrackEntry;

#[cfg(feature = "sgpconfig")]
pub use config_ext::QueueConfigExt;
