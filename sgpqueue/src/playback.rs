//! Surface de lecture
//!
//! Le contrôleur pilote la lecture au travers du trait [`PlaybackSurface`].
//! La fin naturelle d'une piste remonte sous forme de [`PlaybackEvent`] que
//! l'appelant renvoie au contrôleur.
//!
//! [`CommandPlayer`] lance un lecteur externe (par défaut `mpv`) avec l'URL
//! audio en dernier argument, un processus par piste. Chaque lancement porte
//! une génération ; [`PlaybackEvents`] écarte les fins émises par un
//! processus remplacé ou arrêté depuis.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Événements émis par une surface de lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// La piste courante est arrivée à sa fin
    Ended,
}

/// Abstraction de la sortie audio
#[async_trait]
pub trait PlaybackSurface: Send {
    /// Charge une source sans démarrer la lecture
    fn set_source(&mut self, audio_url: &str);

    /// Démarre ou reprend la lecture de la source chargée
    async fn play(&mut self) -> Result<()>;

    /// Arrête la lecture et décharge la source
    fn stop(&mut self);
}

/// Flux des événements d'un [`CommandPlayer`]
pub struct PlaybackEvents {
    rx: mpsc::UnboundedReceiver<(u64, PlaybackEvent)>,
    generation: Arc<AtomicU64>,
}

impl PlaybackEvents {
    /// Prochain événement du processus courant
    ///
    /// `None` une fois le lecteur détruit.
    pub async fn recv(&mut self) -> Option<PlaybackEvent> {
        loop {
            let (generation, event) = self.rx.recv().await?;
            if generation == self.generation.load(Ordering::SeqCst) {
                return Some(event);
            }
            debug!("Dropping {:?} from replaced player (generation {})", event, generation);
        }
    }
}

struct RunningPlayer {
    kill: oneshot::Sender<()>,
    watcher: JoinHandle<()>,
}

/// Lecteur reposant sur une commande externe
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    source: Option<String>,
    running: Option<RunningPlayer>,
    generation: Arc<AtomicU64>,
    events: mpsc::UnboundedSender<(u64, PlaybackEvent)>,
}

impl CommandPlayer {
    /// Crée le lecteur et le canal de ses événements
    ///
    /// `command` est le programme suivi de ses arguments fixes.
    pub fn new(
        command: Vec<String>,
    ) -> Result<(Self, PlaybackEvents)> {
        let mut parts = command.into_iter();
        let program = parts.next().ok_or(Error::EmptyPlayerCommand)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));

        Ok((
            Self {
                program,
                args: parts.collect(),
                source: None,
                running: None,
                generation: generation.clone(),
                events: tx,
            },
            PlaybackEvents { rx, generation },
        ))
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Un processus de lecture est-il en cours ?
    pub fn is_playing(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.watcher.is_finished())
    }

    fn kill_running(&mut self) {
        self.next_generation();
        if let Some(running) = self.running.take() {
            // Le watcher tue le processus à réception (ou si l'émetteur disparaît)
            let _ = running.kill.send(());
        }
    }
}

#[async_trait]
impl PlaybackSurface for CommandPlayer {
    fn set_source(&mut self, audio_url: &str) {
        self.kill_running();
        self.source = Some(audio_url.to_string());
    }

    async fn play(&mut self) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }

        let source = self
            .source
            .clone()
            .ok_or_else(|| Error::PlaybackStartFailed("no source loaded".to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(&source)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::PlaybackStartFailed(format!("{}: {}", self.program, e)))?;

        let generation = self.next_generation();
        info!("Started {} for {}", self.program, source);

        let (kill_tx, kill_rx) = oneshot::channel();
        let events = self.events.clone();
        let watcher = tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => {
                        debug!("Player finished {}", source);
                        let _ = events.send((generation, PlaybackEvent::Ended));
                    }
                    Ok(status) => warn!("Player exited with {} for {}", status, source),
                    Err(e) => warn!("Failed to wait for player: {}", e),
                },
                _ = kill_rx => {
                    if let Err(e) = child.kill().await {
                        warn!("Failed to stop player: {}", e);
                    }
                }
            }
        });

        self.running = Some(RunningPlayer {
            kill: kill_tx,
            watcher,
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.kill_running();
        self.source = None;
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.kill_running();
    }
}
