//! Types d'erreurs pour sgpqueue

/// Erreurs du contrôleur de file de lecture
///
/// Aucune n'est fatale : un échec de résolution n'écarte que l'URL concernée,
/// un échec de lecture ou de sauvegarde devient un message de statut.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Resolver request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid resolver URL: {0}")]
    InvalidResolverUrl(#[from] url::ParseError),

    #[error("Resolver answered {status}: {message}")]
    ResolverStatus { status: u16, message: String },

    #[error("Resolver returned no audio URL")]
    MissingAudioUrl,

    #[error(transparent)]
    Resolver(#[from] sgpresolver::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Player command is empty")]
    EmptyPlayerCommand,

    #[error("Unable to start playback: {0}")]
    PlaybackStartFailed(String),
}

/// Type Result spécialisé pour sgpqueue
pub type Result<T> = std::result::Result<T, Error>;
